//! Clipboard transport for scene objects.

use crate::error::{EditorError, EditorResult};
use crate::object::SceneObject;

/// Serialized form of one object on the clipboard.
pub type Transport = serde_json::Value;

/// Converts objects to and from the clipboard transport.
pub trait ObjectSerializer {
    fn serialize(&self, object: &SceneObject) -> EditorResult<Transport>;

    /// Rebuild an object. The result must carry a fresh id.
    fn deserialize(&self, transport: &Transport) -> EditorResult<SceneObject>;
}

/// Default serializer backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ObjectSerializer for JsonSerializer {
    fn serialize(&self, object: &SceneObject) -> EditorResult<Transport> {
        serde_json::to_value(object).map_err(EditorError::Serialize)
    }

    fn deserialize(&self, transport: &Transport) -> EditorResult<SceneObject> {
        let mut object: SceneObject =
            serde_json::from_value(transport.clone()).map_err(EditorError::Deserialize)?;
        object.regenerate_id();
        Ok(object)
    }
}
