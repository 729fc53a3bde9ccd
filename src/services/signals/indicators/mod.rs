//! Technical indicator implementations.
//!
//! Every indicator is a pure function over an ordered sequence that returns a
//! column aligned with its input, `None` during warm-up. `IndicatorFrame`
//! stitches the columns together and drops incomplete rows.

pub mod atr;
pub mod ema;
pub mod frame;
pub mod macd;
pub mod returns;
pub mod rolling;
pub mod rsi;

pub use atr::{atr, true_range};
pub use ema::{ema, ema_defined};
pub use frame::{ExtendedColumns, FrameProfile, IndicatorFrame, IndicatorRow};
pub use macd::{macd, MacdParams, MacdSeries};
pub use returns::pct_change;
pub use rolling::{diff, rolling_max, rolling_min, rolling_std};
pub use rsi::rsi;
