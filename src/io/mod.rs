/*!
# IO utilities

Compression and dispatching of extracted speeches.
!*/
pub mod compress;
pub mod dispatch;

pub use compress::{CompressType, Encoder};
pub use dispatch::{Dispatch, DispatchHandle, TargetType};
