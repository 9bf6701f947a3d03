use crate::registers::*;

#[test]
fn test_can_control() {
    assert_eq!(0b1000_0000, u8::from(CanControl::new().with_reqop(0b100)));
    assert_eq!(0b0001_0000, u8::from(CanControl::new().with_abat(true)));
    assert_eq!(
        0b0000_0110,
        u8::from(CanControl::new().with_clken(true).with_clkpre(0b10))
    );

    let control = CanControl::from(0x87);
    assert_eq!(0b100, control.reqop());
    assert!(control.clken());
    assert_eq!(0b11, control.clkpre());
}

#[test]
fn test_can_status() {
    let status = CanStatus::from(0b0100_1110);

    assert_eq!(0b010, status.opmod());
    assert_eq!(0b111, status.icod());
}

#[test]
fn test_interrupt_flags() {
    assert_eq!(0b0000_0001, InterruptFlags::rx_flag(0));
    assert_eq!(0b0000_0010, InterruptFlags::rx_flag(1));
    assert_eq!(0b0000_0100, InterruptFlags::tx_flag(0));
    assert_eq!(0b0000_1000, InterruptFlags::tx_flag(1));
    assert_eq!(0b0001_0000, InterruptFlags::tx_flag(2));
    assert_eq!(0b1000_0000, u8::from(InterruptFlags::new().with_merrf(true)));
}

#[test]
fn test_tx_buffer_control() {
    assert_eq!(0b0000_1000, u8::from(TxBufferControl::new().with_txreq(true)));
    assert_eq!(
        0b0111_0011,
        u8::from(
            TxBufferControl::new()
                .with_abtf(true)
                .with_mloa(true)
                .with_txerr(true)
                .with_txp(0b11)
        )
    );
}

#[test]
fn test_rx_buffer_control() {
    assert_eq!(0b0110_0000, u8::from(RxBufferControl::new().with_rxm(0b11)));
    assert!(RxBufferControl::from(0b0000_1000).rxrtr());
}

#[test]
fn test_sid_low() {
    assert_eq!(
        0b1011_1011,
        u8::from(SidLow::new().with_sid(0b101).with_srr(true).with_ide(true).with_eid(0b11))
    );
}

#[test]
fn test_data_length_code() {
    assert_eq!(0b0100_1000, u8::from(DataLengthCode::new().with_rtr(true).with_dlc(8)));
    assert_eq!(0x0F, DataLengthCode::from(0xFF).dlc());
}

#[test]
fn test_cnf3() {
    let cnf3 = Cnf3::from(0x86);

    assert!(cnf3.sof());
    assert_eq!(0b110, cnf3.phseg2());
    assert_eq!(0x06, u8::from(cnf3.with_sof(false)));
}
