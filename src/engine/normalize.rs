/// 将 `value` 从 `[min, max]` 线性映射到 `[0, 100]` 并截断
///
/// `min == max` 时返回中点 50；NaN 输入视为 0。
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 50.0;
    }
    let scaled = (value - min) / (max - min) * 100.0;
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(0.0, 100.0)
}
