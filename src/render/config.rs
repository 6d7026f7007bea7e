//! 网格生成配置
//!
//! 参数扁平化；进程级默认值保存在全局实例中，新建的生成器从这里取初值。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 渲染配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSetting {
    /// 是否启用裁剪附件，默认 true
    /// 关闭后裁剪附件被直接跳过，其余附件不做裁剪
    pub use_clipping: bool,
    /// 每个绘制顺序位置的深度偏移，默认 0.01
    /// z = z_spacing * 绘制顺序索引
    pub z_spacing: f32,
}

impl Default for RenderSetting {
    fn default() -> Self {
        Self {
            use_clipping: true,
            z_spacing: 0.01,
        }
    }
}

/// 全局默认配置
static RENDER_CONFIG: Lazy<RwLock<RenderSetting>> = Lazy::new(|| RwLock::new(RenderSetting::default()));

/// 获取当前默认配置
pub fn get_config() -> RenderSetting {
    match RENDER_CONFIG.read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// 设置默认配置（只影响之后新建的生成器）
pub fn set_config(config: RenderSetting) {
    match RENDER_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(RenderSetting::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let setting = RenderSetting::default();
        assert!(setting.use_clipping);
        assert!((setting.z_spacing - 0.01).abs() < f32::EPSILON);
    }
}
