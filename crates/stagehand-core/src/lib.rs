//! Stagehand Core Library
//!
//! Selection, transform gestures and undoable property recording for a 2D
//! scene editor. Rendering and viewport ownership live outside this crate;
//! it consumes pointer events and the current screen/world transform.

pub mod action;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod handles;
pub mod history;
pub mod input;
pub mod marquee;
pub mod object;
pub mod scene;
pub mod serializer;
pub mod zorder;

pub use action::{ActionRecorder, Change, PropertyChange, SuppressGuard, SuppressionFlag, UndoableAction};
pub use bounds::{bounds_of, combined_bounds};
pub use camera::{Camera, IdentityTransform, WorldTransform};
pub use config::{EditorConfig, HandleConfig, SerializableColor};
pub use engine::{HitTarget, SceneMut, SelectionEngine};
pub use error::{EditorError, EditorResult};
pub use events::{EditorEvent, GesturePhase};
pub use gesture::{GestureMode, TransformGesture, resize_frame};
pub use handles::{Corner, Edge, Handle, HandleKind, SelectionHandleSet};
pub use history::History;
pub use input::{Modifiers, PointerEvent, PointerPhase};
pub use marquee::MarqueeTracker;
pub use object::{ObjectId, ObjectKind, ObjectSnapshot, Property, PropertyValue, SceneObject};
pub use scene::{ObjectMut, Scene, SceneEvent};
pub use serializer::{JsonSerializer, ObjectSerializer, Transport};
