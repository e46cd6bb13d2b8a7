pub mod files;
pub mod settings;
pub mod store;

pub use files::{
    atomic_write, ensure_tide_dir, get_tide_dir, init_local_tide, read_file, settings_file, store_file,
};
pub use settings::{load_settings, save_settings, Settings};
pub use store::{get_as, load_tasks, save_tasks, set_as, FileStore, KeyValueStore, MemoryStore};
