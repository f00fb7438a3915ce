use embedded_hal::spi::SpiDevice;

use crate::platform::{SampleBurst, SensorTransport};

// Control bytes: start bit, channel, 12-bit differential mode. The low bits
// keep the reference powered between conversions; the last conversion
// powers down so PENIRQ is enabled again.
const CMD_Z1: u8 = 0xB1;
const CMD_Z2: u8 = 0xC1;
const CMD_X: u8 = 0x91;
const CMD_Y: u8 = 0xD1;
const CMD_Y_POWER_DOWN: u8 = 0xD0;

// One lead-in command byte, then each 16-bit frame clocks out the next
// command while the previous conversion clocks in.
const FRAME_COMMANDS: [u8; 9] = [
    CMD_Z2,
    CMD_X,
    CMD_X,
    CMD_Y,
    CMD_X,
    CMD_Y,
    CMD_X,
    CMD_Y_POWER_DOWN,
    0x00,
];
const BURST_LEN: usize = 1 + 2 * FRAME_COMMANDS.len();

/// XPT2046 resistive touch controller on an SPI bus.
///
/// Chip select is owned by the `SpiDevice`; a whole burst runs as one
/// transaction.
pub struct Xpt2046<SPI> {
    spi: SPI,
}

impl<SPI> Xpt2046<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> SensorTransport for Xpt2046<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn read_burst(&mut self) -> Result<SampleBurst, Self::Error> {
        let mut buf = command_bytes();
        self.spi.transfer_in_place(&mut buf)?;

        let word = |i: usize| -> i16 {
            let hi = buf[1 + 2 * i] as u16;
            let lo = buf[2 + 2 * i] as u16;
            (((hi << 8) | lo) >> 3) as i16
        };

        // Frame 2 answers the first X command, which is discarded while
        // the plates settle.
        Ok(SampleBurst {
            z1: word(0),
            z2: word(1),
            x: [word(3), word(5), word(7)],
            y: [word(4), word(6), word(8)],
        })
    }
}

fn command_bytes() -> [u8; BURST_LEN] {
    let mut buf = [0u8; BURST_LEN];
    buf[0] = CMD_Z1;
    for (i, cmd) in FRAME_COMMANDS.iter().enumerate() {
        buf[2 + 2 * i] = *cmd;
    }
    buf
}
