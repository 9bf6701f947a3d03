use crate::can::{CanController, CanError, SpiError};
use crate::filter::{Filter, ReceiveMode};
use crate::tests::can::Mocks;
use embedded_can::{ExtendedId, StandardId};
use embedded_hal::spi::ErrorKind;

const EXTENDED_ID: u32 = 0x14C92A2B; //0b000(1_0100_1100_10)(01_0010_1010_0010_1011)
const STANDARD_ID: u16 = 0x6A5;

/// RXFnSIDH addresses of all six filters
const FILTER_REGISTERS: [u8; 6] = [0x00, 0x04, 0x08, 0x10, 0x14, 0x18];

#[test]
fn test_filter_standard_id() {
    let filter = Filter::standard(StandardId::new(STANDARD_ID).unwrap(), 0x7FF);

    assert_eq!(ReceiveMode::StandardOnly, filter.receive_mode());
    assert_eq!(&[0xD4, 0xA0, 0x00, 0x00], filter.filter_registers());
    assert_eq!(&[0xFF, 0xE0, 0x00, 0x00], filter.mask_registers());
}

#[test]
fn test_filter_standard_mask_truncated() {
    // mask 2 lsb only, bits above the 11 bit identifier are dropped
    let filter = Filter::standard(StandardId::new(STANDARD_ID).unwrap(), 0xF803);

    assert_eq!(&[0x00, 0x60, 0x00, 0x00], filter.mask_registers());
}

#[test]
fn test_filter_extended_id() {
    let filter = Filter::extended(ExtendedId::new(EXTENDED_ID).unwrap(), 0x1FFF_FFFF);

    assert_eq!(ReceiveMode::ExtendedOnly, filter.receive_mode());
    assert_eq!(&[0xA6, 0x49, 0x2A, 0x2B], filter.filter_registers());
    assert_eq!(&[0xFF, 0xEB, 0xFF, 0xFF], filter.mask_registers());
}

#[test]
fn test_filter_extended_sid_bits() {
    // All three bits 18-20 end up in SIDL
    let filter = Filter::extended(ExtendedId::new(0x001C_0000).unwrap(), 0xFFFF_FFFF);

    assert_eq!(&[0x00, 0xE8, 0x00, 0x00], filter.filter_registers());
    assert_eq!(&[0xFF, 0xEB, 0xFF, 0xFF], filter.mask_registers());
}

#[test]
fn test_receive_mode_register() {
    assert_eq!(0x20, ReceiveMode::StandardOnly.as_register());
    assert_eq!(0x40, ReceiveMode::ExtendedOnly.as_register());
    assert_eq!(0x60, ReceiveMode::Any.as_register());
}

#[test]
fn test_set_filter_standard_id() {
    let mut controller = Mocks::default().into_controller();
    controller
        .set_filter(StandardId::new(STANDARD_ID).unwrap(), 0x7FF)
        .unwrap();

    let mut expected = vec![
        // Configuration mode
        vec![0x05, 0x0F, 0xE0, 0x80],
    ];

    for (control, mask) in [(0x60, 0x20), (0x70, 0x24)] {
        expected.push(vec![0x02, control, 0x20]);
        expected.push(vec![0x02, mask, 0xFF]);
        expected.push(vec![0x02, mask + 1, 0xE0]);
        expected.push(vec![0x02, mask + 2, 0x00]);
        expected.push(vec![0x02, mask + 3, 0x00]);
    }

    for filter in FILTER_REGISTERS {
        expected.push(vec![0x02, filter, 0xD4]);
        expected.push(vec![0x02, filter + 1, 0xA0]);
        expected.push(vec![0x02, filter + 2, 0x00]);
        expected.push(vec![0x02, filter + 3, 0x00]);
    }

    // Normal mode
    expected.push(vec![0x05, 0x0F, 0xE0, 0x00]);

    let chip = controller.release();
    assert_eq!(expected, chip.write_commands());

    // CANSTAT and CANCTRL are never touched by the filter writes
    assert_eq!(0x00, chip.chip.register(0x0E) & 0xE0);
    assert_eq!(0x07, chip.chip.register(0x0F));
}

#[test]
fn test_set_filter_extended_id() {
    let mut controller = Mocks::default().into_controller();
    controller
        .set_filter_extended(ExtendedId::new(EXTENDED_ID).unwrap(), 0x1FFF_FFFF)
        .unwrap();

    let chip = controller.release();

    // Both receive buffers accept extended frames only
    assert_eq!(0x40, chip.chip.register(0x60));
    assert_eq!(0x40, chip.chip.register(0x70));

    for mask in [0x20, 0x24] {
        assert_eq!([0xFF, 0xEB, 0xFF, 0xFF], chip.chip.registers[mask..mask + 4]);
    }

    for filter in FILTER_REGISTERS {
        let start = filter as usize;
        assert_eq!([0xA6, 0x49, 0x2A, 0x2B], chip.chip.registers[start..start + 4]);
    }
}

#[test]
fn test_set_filter_object() {
    let filter = Filter::standard(StandardId::new(0x120).unwrap(), 0x7F0);

    let mut controller = Mocks::default().into_controller();
    controller.set_filter_object(&filter).unwrap();

    let chip = controller.release();
    assert_eq!([0x24, 0x00, 0x00, 0x00], chip.chip.registers[0x14..0x18]);
    assert_eq!([0xFE, 0x00, 0x00, 0x00], chip.chip.registers[0x24..0x28]);
}

#[test]
fn test_set_filter_transfer_error() {
    let mut mocks = Mocks::default();
    mocks.mock_transfer_error();

    let mut controller = mocks.into_controller();

    assert_eq!(
        Err(CanError::BusErr(SpiError::BusError(ErrorKind::Other))),
        controller.set_filter(StandardId::new(STANDARD_ID).unwrap(), 0x7FF)
    );
}
