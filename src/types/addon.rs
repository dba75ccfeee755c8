#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonManifest {
    pub id: String,
    pub version: String,
}

impl AddonManifest {
    /// `<id>-<version>.zip`, the name Kodi repositories expect for an addon zip.
    pub fn archive_name(&self) -> String {
        format!("{}-{}.zip", self.id, self.version)
    }
}
