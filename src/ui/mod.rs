pub mod preview;
pub mod result_view;
pub mod uploader;
pub mod window;
