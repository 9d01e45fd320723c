//! Tahdiri: single-lesson preparation cards for Saudi school teachers.
//!
//! The form state lives in [`session::LessonSession`], which owns a
//! [`store::RecordStore`] backed by a [`storage::LessonSlot`]. The egui window
//! and the terminal loop in `main.rs` are both thin shells over it.

pub mod content;
pub mod gui;
pub mod lesson;
pub mod preview;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;
pub mod theme;
