//! `kubectl`-backed key source

use tracing::debug;

use super::exec::CommandRunner;
use super::{KeyMaterial, KeySource};
use crate::error::{SealerError, SealerResult};

/// Label the sealed-secrets controller puts on its private key Secrets
pub const SEALING_KEY_LABEL: &str = "sealedsecrets.bitnami.com/sealed-secrets-key";

/// Reads sealing keys from the cluster with `kubectl get secrets`
pub struct Kubectl<R: CommandRunner> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> Kubectl<R> {
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

impl<R: CommandRunner> KeySource for Kubectl<R> {
    fn fetch_key_material(&self, admin_namespace: &str) -> SealerResult<KeyMaterial> {
        let mut args = vec![
            "get".to_string(),
            "secrets".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if !admin_namespace.is_empty() {
            args.push("--namespace".to_string());
            args.push(admin_namespace.to_string());
        }
        args.push("--selector".to_string());
        args.push(SEALING_KEY_LABEL.to_string());

        let output = self
            .runner
            .run(&self.program, &args, &[])
            .map_err(|e| SealerError::KeySource(e.to_string()))?;
        let keys = KeyMaterial::new(output);

        let list: serde_json::Value = serde_json::from_slice(keys.as_bytes())
            .map_err(|e| SealerError::KeySource(format!("kubectl returned invalid JSON: {}", e)))?;
        let count = list
            .get("items")
            .and_then(serde_json::Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        if count == 0 {
            return Err(SealerError::KeySource(format!(
                "no sealing keys found in namespace {:?}",
                admin_namespace
            )));
        }

        debug!(namespace = admin_namespace, count, "fetched sealing keys");
        Ok(keys)
    }
}
