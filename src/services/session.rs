//! Edit session
//!
//! Drives one user-facing operation end to end: decrypt a SealedSecret, hand
//! the plaintext to the editor until it validates, then reconcile and render
//! the result. Nothing is written here; callers decide where output goes.

use tracing::{debug, info};

use super::reconcile::{Reconciler, Reconciliation};
use crate::config::Settings;
use crate::error::{SealerError, SealerResult};
use crate::gateway::{EditingSurface, EncryptionGateway, KeySource};
use crate::models::secret_type::{SERVICE_ACCOUNT_NAME_KEY, SERVICE_ACCOUNT_UID_KEY};
use crate::models::{OutputFormat, PlainResource, Scope, SealedResource, SecretType};
use crate::validation::{validate_secret, FieldError};

const PLACEHOLDER: &str = "changeme";

/// Options for [`EditSession::edit`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EditOptions {
    /// Re-encrypt every key even when nothing changed
    pub force_update: bool,
    pub format: OutputFormat,
}

/// Result of an edit
#[derive(Debug)]
pub enum EditOutcome {
    /// The editor returned the plaintext untouched
    NoChange,
    Updated {
        /// The new SealedSecret, rendered
        output: String,
        reconciliation: Reconciliation,
    },
}

/// Identity and shape of a secret to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSecret {
    pub name: String,
    pub namespace: String,
    pub secret_type: SecretType,
    pub scope: Scope,
}

impl Default for NewSecret {
    fn default() -> Self {
        Self {
            name: PLACEHOLDER.to_string(),
            namespace: "default".to_string(),
            secret_type: SecretType::Opaque,
            scope: Scope::Strict,
        }
    }
}

impl NewSecret {
    /// A Secret pre-filled with placeholder values for its type
    pub fn placeholder(&self) -> PlainResource {
        let mut secret = PlainResource::new(self.name.clone(), self.namespace.clone());
        secret.secret_type = Some(self.secret_type.clone());
        self.scope.apply_to(&mut secret.metadata.annotations);

        match self.secret_type {
            SecretType::Opaque | SecretType::BootstrapToken | SecretType::Custom(_) => {
                secret.payload.insert("change".into(), "me".into());
            }
            _ => {
                for key in self.secret_type.placeholder_keys() {
                    secret.payload.insert(key.to_string(), PLACEHOLDER.into());
                }
            }
        }

        if self.secret_type == SecretType::ServiceAccountToken {
            let annotations = &mut secret.metadata.annotations;
            annotations.insert(SERVICE_ACCOUNT_NAME_KEY.into(), PLACEHOLDER.into());
            annotations.insert(SERVICE_ACCOUNT_UID_KEY.into(), PLACEHOLDER.into());
        }

        secret
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// What came back from the editor
#[derive(Debug)]
pub enum Edited {
    /// Byte-identical to what was presented
    Unchanged,
    Changed {
        text: Vec<u8>,
        resource: PlainResource,
    },
}

/// Decrypt, edit and re-seal SealedSecrets
pub struct EditSession<'a, G, K, E>
where
    G: EncryptionGateway + ?Sized,
    K: KeySource + ?Sized,
    E: EditingSurface + ?Sized,
{
    gateway: &'a G,
    keys: &'a K,
    editor: &'a E,
    settings: &'a Settings,
}

impl<'a, G, K, E> EditSession<'a, G, K, E>
where
    G: EncryptionGateway + ?Sized,
    K: KeySource + ?Sized,
    E: EditingSurface + ?Sized,
{
    pub fn new(gateway: &'a G, keys: &'a K, editor: &'a E, settings: &'a Settings) -> Self {
        Self {
            gateway,
            keys,
            editor,
            settings,
        }
    }

    /// Decrypt a SealedSecret and render it as Secret YAML
    pub fn show(&self, sealed_bytes: &[u8]) -> SealerResult<String> {
        let sealed = SealedResource::from_slice(sealed_bytes)?;
        self.decrypt(&sealed)?.to_yaml()
    }

    /// Let the user edit a SealedSecret and produce its re-sealed form
    pub fn edit(
        &self,
        sealed_bytes: &[u8],
        options: EditOptions,
        on_invalid: impl FnMut(&[FieldError]) -> bool,
    ) -> SealerResult<EditOutcome> {
        let sealed = SealedResource::from_slice(sealed_bytes)?;
        let original = self.decrypt(&sealed)?;
        let original_text = original.to_yaml()?;

        let edited = self.edit_until_valid(original_text.as_bytes(), on_invalid)?;
        let reconciler = Reconciler::new(self.gateway);

        let reconciliation = match edited {
            Edited::Unchanged if !options.force_update => {
                info!("no change");
                return Ok(EditOutcome::NoChange);
            }
            Edited::Unchanged => reconciler.force_reseal(&original, &original)?,
            Edited::Changed { resource, .. } if options.force_update => {
                reconciler.force_reseal(&original, &resource)?
            }
            Edited::Changed { resource, .. } => {
                reconciler.reconcile(&sealed, &original, &resource)?
            }
        };

        let output = options.format.render(&reconciliation.sealed)?;
        Ok(EditOutcome::Updated {
            output,
            reconciliation,
        })
    }

    /// Let the user fill in a new Secret and seal it
    pub fn create(
        &self,
        new: &NewSecret,
        format: OutputFormat,
        on_invalid: impl FnMut(&[FieldError]) -> bool,
    ) -> SealerResult<String> {
        let template = new.placeholder().to_yaml()?;

        let secret = match self.edit_until_valid(template.as_bytes(), on_invalid)? {
            Edited::Unchanged => {
                let secret = PlainResource::from_yaml(template.as_bytes())?;
                let errors = validate_secret(&secret);
                if !errors.is_empty() {
                    return Err(SealerError::Validation(describe(&errors)));
                }
                secret
            }
            Edited::Changed { resource, .. } => resource,
        };

        info!(
            name = secret.metadata.name.as_str(),
            namespace = secret.metadata.namespace.as_str(),
            keys = secret.payload.len(),
            "sealing new secret"
        );
        let sealed = self.gateway.encrypt(&secret)?;
        format.render(&sealed)
    }

    /// Open the editor until the result parses and validates
    ///
    /// Each failed round is reported through `on_invalid`; returning `false`
    /// from it aborts. The next round starts from the rejected text. Output
    /// identical to `content` is returned as [`Edited::Unchanged`] without
    /// further checks.
    pub fn edit_until_valid(
        &self,
        content: &[u8],
        mut on_invalid: impl FnMut(&[FieldError]) -> bool,
    ) -> SealerResult<Edited> {
        let mut current = content.to_vec();

        loop {
            let text = self.editor.edit(&current).map_err(|e| match e {
                SealerError::EditAborted(_) => e,
                other => SealerError::EditAborted(other.to_string()),
            })?;

            if text == content {
                return Ok(Edited::Unchanged);
            }

            let errors = match PlainResource::from_yaml(&text) {
                Ok(resource) => {
                    let errors = validate_secret(&resource);
                    if errors.is_empty() {
                        return Ok(Edited::Changed { text, resource });
                    }
                    errors
                }
                Err(e) => vec![FieldError::invalid("<document>", e.to_string())],
            };

            debug!(count = errors.len(), "edited secret rejected");
            if !on_invalid(&errors) {
                return Err(SealerError::EditAborted(format!(
                    "edited secret is invalid: {}",
                    describe(&errors)
                )));
            }
            current = text;
        }
    }

    fn decrypt(&self, sealed: &SealedResource) -> SealerResult<PlainResource> {
        let keys = self
            .keys
            .fetch_key_material(&self.settings.controller_namespace)?;
        let plain = self.gateway.decrypt(sealed, &keys)?;
        debug!(
            name = plain.metadata.name.as_str(),
            keys = plain.payload.len(),
            "decrypted secret"
        );
        Ok(plain)
    }
}
