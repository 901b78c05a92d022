// crates/dv_io/src/binary.rs

//! 二进制场文件格式
//!
//! # 文件格式 (v1，小端序)
//!
//! ```text
//! [魔数: 4 bytes] "DVGB"
//! [版本: u32]
//! [场类型: u8]       0 海流, 1 风场
//! [单位: u8]         VelocityUnits 编码, 0xFF 表示未声明
//! [拓扑: u8]         0 规则, 1 曲线
//! [行数: u32]
//! [列数: u32]
//! [边界: 4 * f64]    lo_x, lo_y, hi_x, hi_y
//! [节点: rows*cols * (f64, f64)] (仅曲线网格)
//! [帧数: u32]
//! [帧: n_frames * (时间 f64 | rows*cols * (u f32, v f32))]
//! ```
//!
//! 所有帧等长，扫描时只需按偏移读取时间戳。

use dv_config::MoverKind;
use dv_foundation::VelocityUnits;
use dv_mesh::{CellTopology, GridGeometry, WorldRect, MAX_GRID_POINTS};
use glam::DVec2;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{IoError, IoResult};

/// 二进制场文件魔数
pub const BINARY_MAGIC: [u8; 4] = *b"DVGB";

/// 二进制场文件格式版本
pub const BINARY_VERSION: u32 = 1;

/// 未声明单位的编码
const UNITS_UNDECLARED: u8 = 0xFF;

/// 固定头部长度（不含曲线网格节点和帧数）
const FIXED_HEADER_LEN: u64 = 4 + 4 + 1 + 1 + 1 + 4 + 4 + 4 * 8;

/// 二进制场文件头
#[derive(Debug, Clone)]
pub struct BinaryHeader {
    /// 场类型
    pub kind: MoverKind,
    /// 文件声明的单位
    pub units: Option<VelocityUnits>,
    /// 网格几何
    pub geometry: GridGeometry,
    /// 帧数
    pub frame_count: u32,
}

impl BinaryHeader {
    /// 头部总长度（第一帧的起始偏移）
    pub fn header_len(&self) -> u64 {
        let nodes = match self.geometry.topology() {
            CellTopology::Regular => 0,
            CellTopology::Curvilinear { nodes } => nodes.len() as u64 * 16,
        };
        FIXED_HEADER_LEN + nodes + 4
    }

    /// 单帧长度
    pub fn frame_len(&self) -> u64 {
        8 + self.geometry.point_count() as u64 * 8
    }

    /// 第 `index` 帧的起始偏移（指向时间戳），溢出时为 `None`
    pub fn frame_offset(&self, index: usize) -> Option<u64> {
        (index as u64)
            .checked_mul(self.frame_len())?
            .checked_add(self.header_len())
    }

    /// 按文件头声明的完整文件长度，溢出时为 `None`
    pub fn expected_len(&self) -> Option<u64> {
        self.frame_offset(self.frame_count as usize)
    }

    /// 读取文件头
    pub fn read<R: Read>(reader: &mut R, path: &Path) -> IoResult<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != BINARY_MAGIC {
            return Err(IoError::BadMagic {
                file: path.to_path_buf(),
            });
        }

        let version = read_u32(reader)?;
        if version > BINARY_VERSION {
            return Err(IoError::UnsupportedVersion {
                found: version,
                supported: BINARY_VERSION,
            });
        }

        let mut codes = [0u8; 3];
        reader.read_exact(&mut codes)?;
        let kind = MoverKind::from_code(codes[0])
            .ok_or_else(|| IoError::header(path, 0, format!("未知的场类型编码 {}", codes[0])))?;
        let units = match codes[1] {
            UNITS_UNDECLARED => None,
            code => Some(
                VelocityUnits::from_code(code)
                    .ok_or_else(|| IoError::header(path, 0, format!("未知的单位编码 {code}")))?,
            ),
        };

        let rows = read_u32(reader)? as usize;
        let cols = read_u32(reader)? as usize;
        let bounds = WorldRect::new(
            read_f64(reader)?,
            read_f64(reader)?,
            read_f64(reader)?,
            read_f64(reader)?,
        );

        let geometry = match codes[2] {
            0 => GridGeometry::regular(rows, cols, bounds),
            1 => {
                let n = rows
                    .checked_mul(cols)
                    .filter(|&n| n <= MAX_GRID_POINTS)
                    .ok_or_else(|| {
                        IoError::header(path, 0, format!("网格过大: {rows} 行 x {cols} 列"))
                    })?;
                let mut nodes = Vec::with_capacity(n);
                for _ in 0..n {
                    nodes.push(DVec2::new(read_f64(reader)?, read_f64(reader)?));
                }
                GridGeometry::curvilinear(rows, cols, nodes)
            }
            code => return Err(IoError::header(path, 0, format!("未知的拓扑编码 {code}"))),
        }
        .map_err(|e| IoError::header(path, 0, e.to_string()))?;

        let frame_count = read_u32(reader)?;

        Ok(Self {
            kind,
            units,
            geometry,
            frame_count,
        })
    }

    /// 写入文件头
    pub fn write<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        let mut data = Vec::with_capacity(self.header_len() as usize);
        data.extend_from_slice(&BINARY_MAGIC);
        data.extend_from_slice(&BINARY_VERSION.to_le_bytes());
        data.push(self.kind.code());
        data.push(self.units.map_or(UNITS_UNDECLARED, |u| u.code()));

        let topology_code: u8 = if self.geometry.is_regular() { 0 } else { 1 };
        data.push(topology_code);

        data.extend_from_slice(&(self.geometry.rows() as u32).to_le_bytes());
        data.extend_from_slice(&(self.geometry.cols() as u32).to_le_bytes());

        let b = self.geometry.bounds();
        for v in [b.lo_x, b.lo_y, b.hi_x, b.hi_y] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        if let Some(nodes) = self.geometry.nodes() {
            for p in nodes {
                data.extend_from_slice(&p.x.to_le_bytes());
                data.extend_from_slice(&p.y.to_le_bytes());
            }
        }

        data.extend_from_slice(&self.frame_count.to_le_bytes());
        writer.write_all(&data)?;
        Ok(())
    }
}

/// 写入二进制场文件
///
/// 每帧的速度数量必须等于网格节点数。
pub fn write_binary_field<W: Write>(
    writer: &mut W,
    kind: MoverKind,
    units: Option<VelocityUnits>,
    geometry: &GridGeometry,
    frames: &[(f64, Vec<DVec2>)],
) -> IoResult<()> {
    let n = geometry.point_count();
    if let Some((time, values)) = frames.iter().find(|(_, v)| v.len() != n) {
        return Err(IoError::corrupt(
            "",
            0,
            format!("时间 {time} 的帧有 {} 个速度值，网格有 {n} 个节点", values.len()),
        ));
    }

    let frame_count = u32::try_from(frames.len())
        .map_err(|_| IoError::corrupt("", 0, format!("帧数 {} 超出格式上限", frames.len())))?;

    let header = BinaryHeader {
        kind,
        units,
        geometry: geometry.clone(),
        frame_count,
    };
    header.write(writer)?;

    let mut buf = Vec::with_capacity(header.frame_len() as usize);
    for (time, values) in frames {
        buf.clear();
        buf.extend_from_slice(&time.to_le_bytes());
        for v in values {
            buf.extend_from_slice(&(v.x as f32).to_le_bytes());
            buf.extend_from_slice(&(v.y as f32).to_le_bytes());
        }
        writer.write_all(&buf)?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> IoResult<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_f64<R: Read>(reader: &mut R) -> IoResult<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}
