//! Artifact definition transactions.

use bytes::{BufMut, BytesMut};
use ledger_kernel_core::{
    Amount, ArtifactDefinitionNotification, ArtifactDuration, ArtifactFlags, ArtifactId,
    ArtifactProperties, EntityError, EntityReader, EntityType, Notification, NotificationSink,
    PublicKey,
};

use crate::body::{FixedBody, FixedBodyPlugin};

/// Plugin for [`EntityType::ARTIFACT_DEFINITION`].
pub type ArtifactDefinitionPlugin = FixedBodyPlugin<ArtifactDefinitionBody>;

/// Body of an artifact definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactDefinitionBody {
    pub artifact_id: ArtifactId,
    pub properties: ArtifactProperties,
    pub supply: Amount,
}

impl FixedBody for ArtifactDefinitionBody {
    const ENTITY_TYPE: EntityType = EntityType::ARTIFACT_DEFINITION;
    const SIZE: usize = 8 + 8 + 1 + 1 + 8;

    fn read(reader: &mut EntityReader<'_>) -> Result<Self, EntityError> {
        let artifact_id = ArtifactId(reader.read_u64()?);
        let duration = ArtifactDuration(reader.read_u64()?);
        let flags = ArtifactFlags(reader.read_u8()?);
        let divisibility = reader.read_u8()?;
        let supply = Amount(reader.read_u64()?);
        Ok(Self {
            artifact_id,
            properties: ArtifactProperties::new(flags, divisibility, duration),
            supply,
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.artifact_id.get());
        buf.put_u64_le(self.properties.duration.get());
        buf.put_u8(self.properties.flags.0);
        buf.put_u8(self.properties.divisibility);
        buf.put_u64_le(self.supply.get());
    }

    fn publish_body<'a>(&self, signer: PublicKey, sink: &mut dyn NotificationSink<'a>) {
        sink.notify(Notification::ArtifactDefinition(ArtifactDefinitionNotification {
            owner: signer,
            artifact_id: self.artifact_id,
            properties: self.properties,
            supply: self.supply,
        }));
    }
}
