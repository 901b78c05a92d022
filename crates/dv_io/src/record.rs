// crates/dv_io/src/record.rs

//! Mover 配置的二进制持久化
//!
//! 记录可以嵌入更大的二进制流中，读取时只消费本记录的字节。
//! 只保存配置，不保存扫描结果和已加载的帧；读回的 mover 处于未扫描状态。
//!
//! # 记录格式 (v1，小端序)
//!
//! ```text
//! [魔数: 4 bytes] "DVMV"
//! [版本: u32]
//! [类型: u8]
//! [名称: u32 长度 + UTF-8]
//! [路径: u32 长度 + UTF-8]
//! [用户单位: u8]     0xFF 表示未设置
//! [缩放系数: f64]
//! [标志: u8]         bit0 允许外推, bit1 步进优化, bit2 启用
//! [CRC32: u32]       覆盖以上全部字节
//! ```

use dv_config::{MoverConfig, MoverKind};
use dv_foundation::VelocityUnits;
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::error::{IoError, IoResult};

/// 记录魔数
pub const RECORD_MAGIC: [u8; 4] = *b"DVMV";

/// 记录格式版本
pub const RECORD_VERSION: u32 = 1;

/// 字符串字段的最大长度
const MAX_STRING_LEN: u32 = 64 * 1024;

const FLAG_EXTRAPOLATE: u8 = 1 << 0;
const FLAG_OPTIMIZE: u8 = 1 << 1;
const FLAG_ACTIVE: u8 = 1 << 2;
const UNITS_UNSET: u8 = 0xFF;

/// 写入 mover 记录
///
/// 名称或路径超过读取端允许的长度时返回错误，且不写出任何字节。
pub fn write_mover_record<W: Write>(writer: &mut W, config: &MoverConfig) -> IoResult<()> {
    let mut data = Vec::with_capacity(64);

    data.extend_from_slice(&RECORD_MAGIC);
    data.extend_from_slice(&RECORD_VERSION.to_le_bytes());
    data.push(config.kind.code());

    push_str(&mut data, "名称", &config.name)?;
    push_str(&mut data, "路径", &config.path.to_string_lossy())?;

    data.push(config.user_units.map_or(UNITS_UNSET, |u| u.code()));
    data.extend_from_slice(&config.scale_factor.to_le_bytes());

    let mut flags = 0u8;
    if config.allow_extrapolation {
        flags |= FLAG_EXTRAPOLATE;
    }
    if config.optimize_for_step {
        flags |= FLAG_OPTIMIZE;
    }
    if config.active {
        flags |= FLAG_ACTIVE;
    }
    data.push(flags);

    let crc = compute_crc32(&data);
    writer.write_all(&data)?;
    writer.write_all(&crc.to_le_bytes())?;
    Ok(())
}

/// 读取 mover 记录
///
/// 版本不支持或校验和不符时返回格式错误。
pub fn read_mover_record<R: Read>(reader: &mut R) -> IoResult<MoverConfig> {
    let mut reader = CrcReader::new(reader);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != RECORD_MAGIC {
        return Err(IoError::BadMagic {
            file: PathBuf::from("<mover record>"),
        });
    }

    let version = u32::from_le_bytes(reader.read_array()?);
    if version == 0 || version > RECORD_VERSION {
        return Err(IoError::UnsupportedVersion {
            found: version,
            supported: RECORD_VERSION,
        });
    }

    let [kind_code] = reader.read_array::<1>()?;
    let name = reader.read_string()?;
    let path = reader.read_string()?;
    let [units_code] = reader.read_array::<1>()?;
    let scale_factor = f64::from_le_bytes(reader.read_array()?);
    let [flags] = reader.read_array::<1>()?;

    let computed = reader.crc();
    let mut stored = [0u8; 4];
    reader.inner.read_exact(&mut stored)?;
    let stored = u32::from_le_bytes(stored);
    if stored != computed {
        return Err(IoError::Checksum {
            expected: stored,
            found: computed,
        });
    }

    let kind = MoverKind::from_code(kind_code)
        .ok_or_else(|| IoError::corrupt("<mover record>", 0, format!("未知的类型编码 {kind_code}")))?;
    let user_units = match units_code {
        UNITS_UNSET => None,
        code => Some(
            VelocityUnits::from_code(code)
                .ok_or_else(|| IoError::corrupt("<mover record>", 0, format!("未知的单位编码 {code}")))?,
        ),
    };

    Ok(MoverConfig {
        name,
        kind,
        path: PathBuf::from(path),
        user_units,
        scale_factor,
        allow_extrapolation: flags & FLAG_EXTRAPOLATE != 0,
        optimize_for_step: flags & FLAG_OPTIMIZE != 0,
        active: flags & FLAG_ACTIVE != 0,
    })
}

fn push_str(data: &mut Vec<u8>, field: &str, s: &str) -> IoResult<()> {
    let len = u32::try_from(s.len())
        .ok()
        .filter(|&len| len <= MAX_STRING_LEN)
        .ok_or_else(|| {
            IoError::corrupt(
                "<mover record>",
                0,
                format!("{field}长度 {} 超出上限 {MAX_STRING_LEN}", s.len()),
            )
        })?;
    data.extend_from_slice(&len.to_le_bytes());
    data.extend_from_slice(s.as_bytes());
    Ok(())
}

/// 边读边计算 CRC 的读取器
struct CrcReader<'a, R: Read> {
    inner: &'a mut R,
    state: u32,
}

impl<'a, R: Read> CrcReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            state: 0xFFFF_FFFF,
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> IoResult<()> {
        self.inner.read_exact(buf)?;
        for &byte in buf.iter() {
            let index = ((self.state ^ byte as u32) & 0xFF) as usize;
            self.state = CRC32_TABLE[index] ^ (self.state >> 8);
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_string(&mut self) -> IoResult<String> {
        let len = u32::from_le_bytes(self.read_array()?);
        if len > MAX_STRING_LEN {
            return Err(IoError::corrupt("<mover record>", 0, format!("字符串长度 {len} 超出上限")));
        }
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|_| IoError::corrupt("<mover record>", 0, "字符串不是有效的 UTF-8"))
    }

    fn crc(&self) -> u32 {
        !self.state
    }
}

/// 计算 CRC32 校验和（IEEE 多项式）
fn compute_crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = CRC32_TABLE[index] ^ (crc >> 8);
    }
    !crc
}

/// 生成 CRC32 查找表（编译期计算）
const fn generate_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = 0xEDB8_8320 ^ (crc >> 1);
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

const CRC32_TABLE: [u32; 256] = generate_crc32_table();

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> MoverConfig {
        MoverConfig::new(MoverKind::GridWind, "/data/wind.txt")
            .with_name("Gulf wind")
            .with_units(VelocityUnits::Knots)
            .with_scale(0.8)
            .with_extrapolation(true)
    }

    #[test]
    fn test_crc32_known_value() {
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_record_roundtrip_inside_stream() {
        let mut bytes = b"prefix".to_vec();
        write_mover_record(&mut bytes, &sample()).unwrap();
        bytes.extend_from_slice(b"trailer");

        let mut cursor = Cursor::new(bytes);
        let mut prefix = [0u8; 6];
        cursor.read_exact(&mut prefix).unwrap();

        let config = read_mover_record(&mut cursor).unwrap();
        assert_eq!(config, sample());

        let mut rest = String::new();
        cursor.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "trailer");
    }

    #[test]
    fn test_flipped_byte_detected() {
        let mut bytes = Vec::new();
        write_mover_record(&mut bytes, &sample()).unwrap();
        let last_payload = bytes.len() - 5;
        bytes[last_payload] ^= 0x01;
        let err = read_mover_record(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, IoError::Checksum { .. }));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut bytes = Vec::new();
        write_mover_record(&mut bytes, &sample()).unwrap();
        bytes[4..8].copy_from_slice(&7u32.to_le_bytes());
        let err = read_mover_record(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedVersion { found: 7, .. }));
    }

    #[test]
    fn test_string_length_limit_matches_reader() {
        let at_limit = sample().with_name("n".repeat(MAX_STRING_LEN as usize));
        let mut bytes = Vec::new();
        write_mover_record(&mut bytes, &at_limit).unwrap();
        assert_eq!(read_mover_record(&mut Cursor::new(bytes)).unwrap(), at_limit);

        let long_name = sample().with_name("n".repeat(MAX_STRING_LEN as usize + 1));
        let mut bytes = Vec::new();
        let err = write_mover_record(&mut bytes, &long_name).unwrap_err();
        assert!(matches!(err, IoError::CorruptRecord { .. }));
        assert!(bytes.is_empty());

        let long_path = MoverConfig::new(MoverKind::GridCurrent, "p".repeat(MAX_STRING_LEN as usize + 1));
        let err = write_mover_record(&mut bytes, &long_path).unwrap_err();
        assert!(matches!(err, IoError::CorruptRecord { .. }));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_truncated_record() {
        let mut bytes = Vec::new();
        write_mover_record(&mut bytes, &sample()).unwrap();
        bytes.truncate(10);
        assert!(read_mover_record(&mut Cursor::new(bytes)).is_err());
    }
}
