use crate::frame::CanFrame;
use embedded_can::{ExtendedId, Frame, Id, StandardId};

#[test]
fn test_data_frame() {
    let id = StandardId::new(0x123).unwrap();
    let frame = CanFrame::new(id, &[0x01, 0x02, 0x03]).unwrap();

    assert_eq!(Id::Standard(id), frame.id());
    assert!(frame.is_standard());
    assert!(frame.is_data_frame());
    assert_eq!(3, frame.dlc());
    assert_eq!(&[0x01, 0x02, 0x03], frame.data());
}

#[test]
fn test_remote_frame() {
    let id = ExtendedId::new(0x18DA_F110).unwrap();
    let frame = CanFrame::new_remote(id, 8).unwrap();

    assert!(frame.is_extended());
    assert!(frame.is_remote_frame());
    assert_eq!(8, frame.dlc());
    assert_eq!(0, frame.payload_length());
    assert!(frame.data().is_empty());
}

#[test]
fn test_payload_too_long() {
    let id = StandardId::new(0x123).unwrap();

    assert!(CanFrame::new(id, &[0u8; 9]).is_none());
    assert!(CanFrame::new_remote(id, 9).is_none());
}

#[test]
fn test_empty_payload() {
    let frame = CanFrame::new(StandardId::ZERO, &[]).unwrap();

    assert_eq!(0, frame.dlc());
    assert!(frame.data().is_empty());
}
