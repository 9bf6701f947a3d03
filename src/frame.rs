use embedded_can::{Frame, Id};

/// Maximum number of payload bytes of a CAN 2.0 frame
pub const MAX_PAYLOAD: usize = 8;

/// CAN 2.0 frame with fixed payload storage
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CanFrame {
    pub(crate) identifier: Id,
    pub(crate) rtr: bool,
    /// Data length code, requested length for remote frames
    pub(crate) dlc: u8,
    pub(crate) data: [u8; MAX_PAYLOAD],
}

impl CanFrame {
    /// Number of payload bytes carried by the frame
    pub fn payload_length(&self) -> usize {
        if self.rtr {
            return 0;
        }

        (self.dlc as usize).min(MAX_PAYLOAD)
    }
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }

        let mut frame = CanFrame {
            identifier: id.into(),
            rtr: false,
            dlc: data.len() as u8,
            data: [0; MAX_PAYLOAD],
        };
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_PAYLOAD {
            return None;
        }

        Some(CanFrame {
            identifier: id.into(),
            rtr: true,
            dlc: dlc as u8,
            data: [0; MAX_PAYLOAD],
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.identifier, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.rtr
    }

    fn id(&self) -> Id {
        self.identifier
    }

    fn dlc(&self) -> usize {
        self.dlc as usize
    }

    fn data(&self) -> &[u8] {
        &self.data[..self.payload_length()]
    }
}
