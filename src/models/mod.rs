/// 核心枚举定义模块
pub mod enums;
/// 核心结构体定义模块
pub mod structs;
/// 五类设备测试数据模块
pub mod test_data;
/// 单元测试模块
#[cfg(test)]
mod tests;

// 重新导出所有类型，方便其他模块使用
pub use enums::*;
pub use structs::*;
pub use test_data::*;
