// crates/dv_mover/src/particle.rs

//! 粒子（LE，拉格朗日单元）记录

use dv_mesh::WorldPoint3D;

/// 粒子状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeStatus {
    /// 尚未释放
    NotReleased,
    /// 在水中（唯一会被 mover 移动的状态）
    #[default]
    InWater,
    /// 搁浅
    OnLand,
    /// 离开地图
    OffMaps,
    /// 已蒸发
    Evaporated,
}

/// 粒子记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeRecord {
    /// 位置（经度, 纬度, 深度 [m]）
    pub position: WorldPoint3D,
    /// 风漂系数
    pub windage: f64,
    /// 本步的风漂随机扰动因子，由调用方每步抽样，默认 1
    pub windage_factor: f64,
    /// 状态
    pub status: LeStatus,
}

impl LeRecord {
    /// 水面上的在水粒子
    pub fn surface(x: f64, y: f64, windage: f64) -> Self {
        Self {
            position: WorldPoint3D::surface(x, y),
            windage,
            windage_factor: 1.0,
            status: LeStatus::InWater,
        }
    }

    /// 设置深度
    pub fn with_depth(mut self, z: f64) -> Self {
        self.position.z = z;
        self
    }

    /// 设置本步的风漂随机扰动因子
    pub fn with_windage_factor(mut self, factor: f64) -> Self {
        self.windage_factor = factor;
        self
    }

    /// 风场 mover 实际使用的风漂系数：风漂系数 × 随机扰动因子
    #[inline]
    pub fn effective_windage(&self) -> f64 {
        self.windage * self.windage_factor
    }

    /// 设置状态
    pub fn with_status(mut self, status: LeStatus) -> Self {
        self.status = status;
        self
    }

    /// 是否会被 mover 移动
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.status == LeStatus::InWater
    }

    /// 是否在水面（风场只作用于水面粒子）
    #[inline]
    pub fn at_surface(&self) -> bool {
        self.position.z <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_windage() {
        let le = LeRecord::surface(0.0, 0.0, 0.03);
        assert_eq!(le.effective_windage(), 0.03);
        assert_eq!(le.with_windage_factor(0.5).effective_windage(), 0.015);
        assert_eq!(le.with_windage_factor(0.0).effective_windage(), 0.0);
    }
}
