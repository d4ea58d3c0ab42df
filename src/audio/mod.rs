pub mod analyser;
pub mod decode;
pub mod source;
pub mod window;
