/// A transport capable of delivering command and data transactions to the SSD1327.
///
/// Each call is one atomic bus transaction from the driver's point of view. Bus bring-up and
/// clock configuration are optional; interfaces that do not own their bus leave the defaults.
pub trait DisplayInterface {
    type Error;

    /// Bring up the underlying bus.
    fn begin_bus(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Change the bus clock rate, in Hz.
    fn set_clock_rate(&mut self, _hz: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Send a stream of command bytes (opcodes and their operands) as one transaction.
    fn send_commands(&mut self, cmds: &[u8]) -> Result<(), Self::Error>;

    /// Send a stream of display RAM bytes as one transaction.
    fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

pub mod i2c {
    //! The I2C ("two-wire") interface of the SSD1327. Every transaction is the device address,
    //! a control byte selecting command or data mode, and then the payload. The controller has no
    //! D/C pin in this mode, so the control byte is the only thing distinguishing the two.

    use hal::blocking::i2c::Write;

    use super::DisplayInterface;

    /// The address most SSD1327 I2C modules strap by default.
    pub const DEFAULT_ADDRESS: u8 = 0x3C;

    const CONTROL_COMMAND: u8 = 0x00;
    const CONTROL_DATA: u8 = 0x40;

    /// Largest payload sent in one transaction: one full row of 64 column pairs.
    const MAX_PAYLOAD: usize = 64;

    /// Bus-level setup which `embedded-hal` does not model, such as (re)starting the peripheral
    /// or changing its clock. Implement this for whatever owns the bus on your platform.
    pub trait BusControl {
        type Error;

        fn begin(&mut self) -> Result<(), Self::Error>;
        fn set_clock_rate(&mut self, hz: u32) -> Result<(), Self::Error>;
    }

    /// `BusControl` for a bus which is owned and configured by someone else, e.g. when several
    /// devices share it. All calls succeed without doing anything.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SharedBus;

    impl BusControl for SharedBus {
        type Error = core::convert::Infallible;

        fn begin(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_clock_rate(&mut self, _hz: u32) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// Failure of either the I2C write itself or of the bus control capability.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum BusError<W, C> {
        Write(W),
        Control(C),
    }

    pub struct I2cInterface<I2C, BC = SharedBus> {
        /// The I2C master connected to the SSD1327.
        i2c: I2C,
        /// Bring-up and clock control for the bus `i2c` lives on.
        bus: BC,
        /// 7-bit device address of the SSD1327.
        address: u8,
    }

    impl<I2C> I2cInterface<I2C, SharedBus>
    where
        I2C: Write,
    {
        /// Create a new I2C interface on a bus that is already set up. `address` is the 7-bit
        /// address of the display, usually `DEFAULT_ADDRESS`.
        pub fn new(i2c: I2C, address: u8) -> Self {
            Self::with_bus_control(i2c, SharedBus, address)
        }
    }

    impl<I2C, BC> I2cInterface<I2C, BC>
    where
        I2C: Write,
        BC: BusControl,
    {
        /// Create a new I2C interface which also controls bus bring-up and clock rate through
        /// `bus`.
        pub fn with_bus_control(i2c: I2C, bus: BC, address: u8) -> Self {
            Self { i2c, bus, address }
        }

        /// Give back the bus and its control capability.
        pub fn release(self) -> (I2C, BC) {
            (self.i2c, self.bus)
        }

        fn write_framed(&mut self, control: u8, payload: &[u8]) -> Result<(), I2C::Error> {
            let mut frame = [0u8; MAX_PAYLOAD + 1];
            frame[0] = control;
            for chunk in payload.chunks(MAX_PAYLOAD) {
                frame[1..=chunk.len()].copy_from_slice(chunk);
                self.i2c.write(self.address, &frame[..=chunk.len()])?;
            }
            Ok(())
        }
    }

    impl<I2C, BC> DisplayInterface for I2cInterface<I2C, BC>
    where
        I2C: Write,
        BC: BusControl,
    {
        type Error = BusError<I2C::Error, BC::Error>;

        fn begin_bus(&mut self) -> Result<(), Self::Error> {
            self.bus.begin().map_err(BusError::Control)
        }

        fn set_clock_rate(&mut self, hz: u32) -> Result<(), Self::Error> {
            self.bus.set_clock_rate(hz).map_err(BusError::Control)
        }

        fn send_commands(&mut self, cmds: &[u8]) -> Result<(), Self::Error> {
            self.write_framed(CONTROL_COMMAND, cmds)
                .map_err(BusError::Write)
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.write_framed(CONTROL_DATA, buf).map_err(BusError::Write)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::vec::Vec;

        #[derive(Default)]
        struct RecordingI2c {
            writes: Vec<(u8, Vec<u8>)>,
        }

        impl Write for RecordingI2c {
            type Error = ();

            fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ()> {
                self.writes.push((address, bytes.to_vec()));
                Ok(())
            }
        }

        #[derive(Default)]
        struct CountingBus {
            begins: usize,
            clock: Option<u32>,
        }

        impl BusControl for CountingBus {
            type Error = ();

            fn begin(&mut self) -> Result<(), ()> {
                self.begins += 1;
                Ok(())
            }

            fn set_clock_rate(&mut self, hz: u32) -> Result<(), ()> {
                self.clock = Some(hz);
                Ok(())
            }
        }

        #[test]
        fn command_transaction_framing() {
            let mut iface = I2cInterface::new(RecordingI2c::default(), DEFAULT_ADDRESS);
            iface.send_commands(&[0xAE, 0x81, 0x80]).unwrap();
            let (i2c, _) = iface.release();
            assert_eq!(i2c.writes, vec![(0x3C, vec![0x00, 0xAE, 0x81, 0x80])]);
        }

        #[test]
        fn data_transaction_framing() {
            let mut iface = I2cInterface::new(RecordingI2c::default(), 0x3D);
            iface.send_data(&[0xDE, 0xAD]).unwrap();
            let (i2c, _) = iface.release();
            assert_eq!(i2c.writes, vec![(0x3D, vec![0x40, 0xDE, 0xAD])]);
        }

        #[test]
        fn long_payload_split() {
            let mut iface = I2cInterface::new(RecordingI2c::default(), DEFAULT_ADDRESS);
            let payload = (0..100).collect::<Vec<u8>>();
            iface.send_data(&payload).unwrap();
            let (i2c, _) = iface.release();
            assert_eq!(i2c.writes.len(), 2);
            assert_eq!(i2c.writes[0].1.len(), 65);
            assert_eq!(i2c.writes[0].1[0], 0x40);
            assert_eq!(&i2c.writes[0].1[1..], &payload[..64]);
            assert_eq!(i2c.writes[1].1[0], 0x40);
            assert_eq!(&i2c.writes[1].1[1..], &payload[64..]);
        }

        #[test]
        fn empty_payload_sends_nothing() {
            let mut iface = I2cInterface::new(RecordingI2c::default(), DEFAULT_ADDRESS);
            iface.send_data(&[]).unwrap();
            let (i2c, _) = iface.release();
            assert!(i2c.writes.is_empty());
        }

        #[test]
        fn bus_control_delegation() {
            let mut iface = I2cInterface::with_bus_control(
                RecordingI2c::default(),
                CountingBus::default(),
                DEFAULT_ADDRESS,
            );
            iface.begin_bus().unwrap();
            iface.set_clock_rate(400_000).unwrap();
            let (i2c, bus) = iface.release();
            assert!(i2c.writes.is_empty());
            assert_eq!(bus.begins, 1);
            assert_eq!(bus.clock, Some(400_000));
        }
    }
}

#[cfg(test)]
pub mod test_spy {
    //! An interface for use in unit tests to spy on whatever was sent to it, and a simulated
    //! controller that replays what was sent into display RAM.

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec::Vec;

    use super::DisplayInterface;

    /// One recorded bus operation.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Begin,
        Clock(u32),
        Cmd(Vec<u8>),
        Data(Vec<u8>),
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct SpyError;

    /// Records every transaction. `split` hands out a second handle onto the same record, so a
    /// test can keep one while the display owns the other.
    pub struct TestSpyInterface {
        sent: Rc<RefCell<Vec<Sent>>>,
        fail_after: Rc<Cell<Option<usize>>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            TestSpyInterface {
                sent: Rc::new(RefCell::new(Vec::new())),
                fail_after: Rc::new(Cell::new(None)),
            }
        }

        pub fn split(&self) -> Self {
            TestSpyInterface {
                sent: self.sent.clone(),
                fail_after: self.fail_after.clone(),
            }
        }

        pub fn check_multi(&self, expect: &[Sent]) {
            assert_eq!(&self.sent.borrow()[..], expect);
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.borrow().clone()
        }

        /// Total pixel-data bytes across all recorded data transactions.
        pub fn data_bytes(&self) -> usize {
            self.sent
                .borrow()
                .iter()
                .map(|s| match s {
                    Sent::Data(d) => d.len(),
                    _ => 0,
                })
                .sum()
        }

        pub fn clear(&self) {
            self.sent.borrow_mut().clear()
        }

        /// Let `n` more operations succeed, then fail every one after that.
        pub fn fail_after(&self, n: usize) {
            self.fail_after.set(Some(n));
        }

        /// Stop failing operations.
        pub fn recover(&self) {
            self.fail_after.set(None);
        }

        fn record(&mut self, s: Sent) -> Result<(), SpyError> {
            match self.fail_after.get() {
                Some(0) => return Err(SpyError),
                Some(n) => self.fail_after.set(Some(n - 1)),
                None => {}
            }
            self.sent.borrow_mut().push(s);
            Ok(())
        }
    }

    impl DisplayInterface for TestSpyInterface {
        type Error = SpyError;

        fn begin_bus(&mut self) -> Result<(), SpyError> {
            self.record(Sent::Begin)
        }
        fn set_clock_rate(&mut self, hz: u32) -> Result<(), SpyError> {
            self.record(Sent::Clock(hz))
        }
        fn send_commands(&mut self, cmds: &[u8]) -> Result<(), SpyError> {
            self.record(Sent::Cmd(cmds.to_vec()))
        }
        fn send_data(&mut self, data: &[u8]) -> Result<(), SpyError> {
            self.record(Sent::Data(data.to_vec()))
        }
    }

    /// Just enough of an SSD1327 to check what the driver sends. Gray RAM is addressed through
    /// the column/row window with horizontal increment. Transactions consisting of a single page
    /// or column-nibble opcode switch data writes over to a separate page-addressed RAM instead.
    pub struct SimulatedPanel {
        pub gray: [[u8; 64]; 128],
        pub pages: [[u8; 132]; 8],
        window: (u8, u8, u8, u8),
        col: u8,
        row: u8,
        page_mode: bool,
        page: usize,
        page_col: usize,
        pub display_on: bool,
    }

    impl SimulatedPanel {
        pub fn new() -> Self {
            Self {
                gray: [[0; 64]; 128],
                pages: [[0; 132]; 8],
                window: (0, 63, 0, 127),
                col: 0,
                row: 0,
                page_mode: false,
                page: 0,
                page_col: 0,
                display_on: false,
            }
        }

        pub fn replay(sent: &[Sent]) -> Self {
            let mut panel = Self::new();
            for s in sent {
                match s {
                    Sent::Cmd(bytes) if bytes.len() == 1 && is_page_opcode(bytes[0]) => {
                        panel.page_command(bytes[0])
                    }
                    Sent::Cmd(bytes) => panel.commands(bytes),
                    Sent::Data(bytes) => panel.data(bytes),
                    _ => {}
                }
            }
            panel
        }

        /// Whether the pixel at (`x`, `y`) is lit in gray RAM.
        pub fn gray_pixel(&self, x: usize, y: usize) -> bool {
            let byte = self.gray[y][x / 2];
            let nibble = if x % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            nibble != 0
        }

        fn page_command(&mut self, op: u8) {
            self.page_mode = true;
            match op {
                0xB0..=0xB7 => self.page = (op & 0x07) as usize,
                0x00..=0x0F => self.page_col = (self.page_col & 0xF0) | (op & 0x0F) as usize,
                _ => self.page_col = (self.page_col & 0x0F) | (((op & 0x0F) as usize) << 4),
            }
        }

        fn commands(&mut self, bytes: &[u8]) {
            let mut i = 0;
            while i < bytes.len() {
                let op = bytes[i];
                match op {
                    0x15 => {
                        self.window.0 = bytes[i + 1];
                        self.window.1 = bytes[i + 2];
                        self.col = self.window.0;
                        self.page_mode = false;
                        i += 3;
                    }
                    0x75 => {
                        self.window.2 = bytes[i + 1];
                        self.window.3 = bytes[i + 2];
                        self.row = self.window.2;
                        self.page_mode = false;
                        i += 3;
                    }
                    0xA4..=0xA7 => i += 1,
                    0xAE => {
                        self.display_on = false;
                        i += 1
                    }
                    0xAF => {
                        self.display_on = true;
                        i += 1
                    }
                    0x81 | 0xA0 | 0xA1 | 0xA2 | 0xA8 | 0xAB | 0xB1 | 0xB3 | 0xB6 | 0xBC
                    | 0xBE | 0xD5 | 0xFD => i += 2,
                    _ => panic!("simulated panel: unknown opcode {:#04x}", op),
                }
            }
        }

        fn data(&mut self, bytes: &[u8]) {
            for &b in bytes {
                if self.page_mode {
                    self.pages[self.page][self.page_col] = b;
                    self.page_col += 1;
                } else {
                    self.gray[self.row as usize][self.col as usize] = b;
                    if self.col == self.window.1 {
                        self.col = self.window.0;
                        self.row = if self.row == self.window.3 {
                            self.window.2
                        } else {
                            self.row + 1
                        };
                    } else {
                        self.col += 1;
                    }
                }
            }
        }
    }

    fn is_page_opcode(op: u8) -> bool {
        match op {
            0xB0..=0xB7 | 0x00..=0x0F => true,
            0x10..=0x1F => op != 0x15,
            _ => false,
        }
    }
}
