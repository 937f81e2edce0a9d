//! `kubeseal`-backed encryption gateway

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::exec::CommandRunner;
use super::{EncryptionGateway, KeyMaterial};
use crate::error::{SealerError, SealerResult};
use crate::models::{IdentityContext, PlainResource, RequiredIdentity, SealedResource, Scope};

/// Encryption gateway that shells out to `kubeseal`
pub struct Kubeseal<R: CommandRunner> {
    runner: R,
    program: String,
    cert: Option<PathBuf>,
    temp_prefix: String,
}

impl<R: CommandRunner> Kubeseal<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            cert: None,
            temp_prefix: "kubectl-sealer-".to_string(),
        }
    }

    /// Seal offline against a public certificate instead of the controller
    pub fn with_cert(mut self, cert: Option<PathBuf>) -> Self {
        self.cert = cert;
        self
    }

    /// Prefix for temporary key files
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    fn push_cert_args(&self, args: &mut Vec<String>) {
        if let Some(cert) = &self.cert {
            args.push("--cert".to_string());
            args.push(cert.display().to_string());
        }
    }

    fn seal(&self, plain: &PlainResource, allow_empty_data: bool) -> SealerResult<SealedResource> {
        let mut args = vec!["--format".to_string(), "json".to_string()];
        if allow_empty_data {
            args.push("--allow-empty-data".to_string());
        }
        self.push_cert_args(&mut args);

        let input = plain.to_json()?;
        let output = self
            .runner
            .run(&self.program, &args, &input)
            .map_err(|e| SealerError::Encryption(e.to_string()))?;

        SealedResource::from_slice(&output)
    }
}

/// Arguments selecting the scope and identity for raw encryption
///
/// Re-checks the identity contract so a hand-built context cannot reach the
/// sealing tool with a missing field.
fn identity_args(identity: &IdentityContext) -> SealerResult<Vec<String>> {
    let required = RequiredIdentity::for_scope(identity.scope);
    let name = identity.name.as_deref().unwrap_or_default();
    let namespace = identity.namespace.as_deref().unwrap_or_default();

    if required.name && name.is_empty() {
        return Err(SealerError::IdentityIncomplete {
            scope: identity.scope,
            field: "name",
        });
    }
    if required.namespace && namespace.is_empty() {
        return Err(SealerError::IdentityIncomplete {
            scope: identity.scope,
            field: "namespace",
        });
    }

    let mut args = vec!["--scope".to_string(), identity.scope.as_str().to_string()];
    match identity.scope {
        Scope::Strict => {
            args.extend(["--name".to_string(), name.to_string()]);
            args.extend(["--namespace".to_string(), namespace.to_string()]);
        }
        Scope::NamespaceWide => {
            args.extend(["--namespace".to_string(), namespace.to_string()]);
        }
        Scope::ClusterWide => {}
    }
    Ok(args)
}

impl<R: CommandRunner> EncryptionGateway for Kubeseal<R> {
    fn encrypt(&self, plain: &PlainResource) -> SealerResult<SealedResource> {
        debug!(name = %plain.metadata.name, keys = plain.payload.len(), "sealing whole secret");
        self.seal(plain, false)
    }

    fn encrypt_skeleton(&self, plain: &PlainResource) -> SealerResult<SealedResource> {
        debug!(name = %plain.metadata.name, "sealing metadata skeleton");
        self.seal(plain, true)
    }

    fn encrypt_raw(&self, value: &[u8], identity: &IdentityContext) -> SealerResult<String> {
        let mut args = vec![
            "--raw".to_string(),
            "--from-file".to_string(),
            "/dev/stdin".to_string(),
        ];
        args.extend(identity_args(identity)?);
        self.push_cert_args(&mut args);

        let output = self
            .runner
            .run(&self.program, &args, value)
            .map_err(|e| SealerError::Encryption(e.to_string()))?;

        let cipher = String::from_utf8(output)
            .map_err(|_| SealerError::Encryption("kubeseal returned non-text ciphertext".into()))?;
        Ok(cipher.trim().to_string())
    }

    fn decrypt(&self, sealed: &SealedResource, keys: &KeyMaterial) -> SealerResult<PlainResource> {
        // Key file is created 0600 and removed when `key_file` drops
        let mut key_file = tempfile::Builder::new()
            .prefix(&self.temp_prefix)
            .suffix(".json")
            .tempfile()
            .map_err(|e| SealerError::Io(format!("failed creating temporary key file: {}", e)))?;
        key_file
            .write_all(keys.as_bytes())
            .and_then(|_| key_file.flush())
            .map_err(|e| SealerError::Io(format!("failed writing temporary key file: {}", e)))?;

        let args = vec![
            "--recovery-unseal".to_string(),
            "--recovery-private-key".to_string(),
            key_file.path().display().to_string(),
        ];

        let input = sealed.to_json()?;
        let output = zeroize::Zeroizing::new(
            self.runner
                .run(&self.program, &args, &input)
                .map_err(|e| SealerError::Decryption(e.to_string()))?,
        );

        let mut plain = PlainResource::from_json(&output)
            .map_err(|e| SealerError::Decryption(e.to_string()))?;
        plain.metadata.owner_references.clear();
        Ok(plain)
    }
}
