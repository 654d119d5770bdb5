//! Supporting visual components
//!
//! Self-contained widgets that drive their own animations. Each one mounts
//! onto existing elements with `mount(...)` and releases its tick callbacks,
//! tweens, observers and listeners on `dispose()` or drop.

pub mod circular_gallery;
pub mod count_up;
pub mod logo_loop;
pub mod preloader;

pub use circular_gallery::{CircularGallery, GalleryOptions, ItemPose};
pub use count_up::{format_number, CountUp, CountUpOptions};
pub use logo_loop::{LogoLoop, LogoLoopOptions, LoopDirection};
pub use preloader::{Preloader, PreloaderOptions};
