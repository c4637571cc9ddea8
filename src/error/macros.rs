//! # 错误处理宏

/// 快速构造 `GatewayError`
///
/// ```ignore
/// return Err(error!(Config, "端口不能为0"));
/// return Err(error!(Database, "查询失败", err));
/// ```
#[macro_export]
macro_rules! error {
    ($variant:ident, $msg:expr) => {
        $crate::error::GatewayError::$variant {
            message: ($msg).into(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr, $source:expr) => {
        $crate::error::GatewayError::$variant {
            message: ($msg).into(),
            source: Some(::anyhow::Error::from($source)),
        }
    };
}

/// 提前返回错误
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::error!($variant, $msg).into())
    };
    ($variant:ident, $msg:expr, $source:expr) => {
        return Err($crate::error!($variant, $msg, $source).into())
    };
}

/// 确保条件成立，否则返回指定类型的错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident, $msg:expr) => {
        if !($cond) {
            $crate::bail!($variant, $msg);
        }
    };
}
