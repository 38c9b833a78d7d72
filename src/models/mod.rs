pub mod image_slot;
pub mod settings;

pub use image_slot::ImageSlot;
pub use settings::{STORED_SEPARATELY, SiteSettings, SiteSettingsPatch};
