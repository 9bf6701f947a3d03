use crate::status::{InterruptCode, OperationMode, OperationStatus, TransmitStatus};
use OperationMode::{Configuration, ListenOnly, Loopback, Normal, Sleep};

#[test]
fn test_operation_status_from_register() {
    assert_eq!(Some(Normal), OperationStatus::from_register(0b0000_0000).mode);
    assert_eq!(Some(Sleep), OperationStatus::from_register(0b0010_0000).mode);
    assert_eq!(Some(Loopback), OperationStatus::from_register(0b0100_0000).mode);
    assert_eq!(Some(ListenOnly), OperationStatus::from_register(0b0110_0000).mode);
    assert_eq!(Some(Configuration), OperationStatus::from_register(0b1000_0000).mode);

    // Reserved mode bits
    assert_eq!(None, OperationStatus::from_register(0b1010_0000).mode);
    assert_eq!(0b101, OperationStatus::from_register(0b1010_0000).mode_bits);
    assert_eq!(None, OperationStatus::from_register(0b1110_0000).mode);
}

#[test]
fn test_interrupt_code_from_register() {
    assert_eq!(InterruptCode::None, OperationStatus::from_register(0b1000_0000).interrupt);
    assert_eq!(InterruptCode::Error, OperationStatus::from_register(0b1000_0010).interrupt);
    assert_eq!(InterruptCode::WakeUp, OperationStatus::from_register(0b1000_0100).interrupt);
    assert_eq!(InterruptCode::TxBuffer0, OperationStatus::from_register(0b1000_0110).interrupt);
    assert_eq!(InterruptCode::TxBuffer1, OperationStatus::from_register(0b1000_1000).interrupt);
    assert_eq!(InterruptCode::TxBuffer2, OperationStatus::from_register(0b1000_1010).interrupt);
    assert_eq!(InterruptCode::RxBuffer0, OperationStatus::from_register(0b1000_1100).interrupt);
    assert_eq!(InterruptCode::RxBuffer1, OperationStatus::from_register(0b1000_1111).interrupt);
}

#[test]
fn test_transmit_status_from_register() {
    let status = TransmitStatus::from_register(0b0000_1011);
    assert!(status.pending);
    assert!(!status.is_failed());

    assert!(TransmitStatus::from_register(0b0100_0000).aborted);
    assert!(TransmitStatus::from_register(0b0010_0000).lost_arbitration);
    assert!(TransmitStatus::from_register(0b0001_0000).error);

    assert!(TransmitStatus::from_register(0b0100_0000).is_failed());
    assert!(TransmitStatus::from_register(0b0010_0000).is_failed());
    assert!(TransmitStatus::from_register(0b0001_0000).is_failed());
    assert!(!TransmitStatus::from_register(0b1000_0000).is_failed());
}
