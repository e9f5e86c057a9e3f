pub mod cursor;
pub mod freehand;
pub mod overlay;
pub mod shapes;
pub mod text;
pub mod tools;
