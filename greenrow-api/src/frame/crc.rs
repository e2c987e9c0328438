/// CRC-16 using the reflected 0x8005 polynomial (0xA001) with an initial
/// value of 0xFFFF, the variant the row controller firmware uses.
struct Crc16 {
    table: [u16; 256],
}

impl Crc16 {
    const POLYNOMIAL: u16 = 0xA001;
    const INIT: u16 = 0xFFFF;

    /// Builds the lookup table at compile time
    const fn new() -> Self {
        let mut table = [0u16; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u16;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ Self::POLYNOMIAL;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        Self { table }
    }

    fn update(&self, mut crc: u16, data: &[u8]) -> u16 {
        for &byte in data {
            let index = ((crc ^ byte as u16) & 0xFF) as usize;
            crc = (crc >> 8) ^ self.table[index];
        }
        crc
    }
}

static CRC16: Crc16 = Crc16::new();

/// CRC-16/MODBUS of `data`
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.update(Crc16::INIT, data)
}
