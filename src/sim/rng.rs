//! 随机数发生器
//!
//! 由显式的 seed 与 run 编号构造，不依赖任何全局状态。

use rand::SeedableRng;
use rand::rngs::StdRng;

/// 按 (seed, run) 构造确定性的随机数发生器。
///
/// 相同的 (seed, run) 总是得到相同的随机序列；run 用于在同一 seed 下切换子序列。
pub fn seeded_rng(seed: u64, run: u64) -> StdRng {
    // splitmix64 风格的混合，避免 (seed, run) 与 (seed + 1, run - 1) 落到同一序列
    let mut z = seed ^ run.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    StdRng::seed_from_u64(z)
}
