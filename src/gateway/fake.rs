//! In-memory collaborators for tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::exec::CommandRunner;
use super::{EditingSurface, EncryptionGateway, KeyMaterial, KeySource};
use crate::error::{SealerError, SealerResult};
use crate::models::{
    EncryptedData, IdentityContext, Payload, PlainResource, SealedResource, SealedSpec,
    SecretTemplate,
};

/// One recorded process invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes fed on stdin, or the file content handed to an interactive program
    pub stdin: Vec<u8>,
}

/// `CommandRunner` replaying scripted outputs
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: RefCell<VecDeque<SealerResult<Vec<u8>>>>,
    edit_result: Option<Vec<u8>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn with_outputs(outputs: Vec<SealerResult<Vec<u8>>>) -> Self {
        Self {
            outputs: RefCell::new(outputs.into()),
            ..Default::default()
        }
    }

    /// Interactive calls overwrite the file named by their last argument
    pub fn with_edit(content: Vec<u8>) -> Self {
        Self {
            edit_result: Some(content),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn next_output(&self, program: &str) -> SealerResult<Vec<u8>> {
        self.outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SealerError::Io(format!("unexpected call to {}", program))))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> SealerResult<Vec<u8>> {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            stdin: stdin.to_vec(),
        });
        self.next_output(program)
    }

    fn run_interactive(&self, program: &str, args: &[String]) -> SealerResult<()> {
        let path = args.last().cloned().unwrap_or_default();
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
            stdin: std::fs::read(&path).unwrap_or_default(),
        });

        match &self.edit_result {
            Some(content) => std::fs::write(&path, content).map_err(SealerError::from),
            None => self.next_output(program).map(|_| ()),
        }
    }
}

/// Encryption gateway producing readable, call-unique ciphertext
///
/// Every ciphertext embeds a global call number, so two encryptions of the
/// same value never compare equal, mimicking randomized encryption.
#[derive(Default)]
pub struct FakeGateway {
    /// What `decrypt` hands back as payload
    pub plaintext: Payload,
    /// `encrypt_raw` fails for this value
    pub fail_raw_on: Option<String>,
    pub fail_skeleton: bool,
    pub fail_full: bool,
    /// Last ciphertext number handed out
    pub counter: Cell<usize>,
    pub full_calls: Cell<usize>,
    pub skeleton_calls: Cell<usize>,
    pub raw_calls: Cell<usize>,
    pub decrypt_calls: Cell<usize>,
    pub raw_identities: RefCell<Vec<IdentityContext>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plaintext(plaintext: Payload) -> Self {
        Self {
            plaintext,
            ..Default::default()
        }
    }

    /// Total number of encryption calls of any kind
    pub fn encrypt_calls(&self) -> usize {
        self.full_calls.get() + self.skeleton_calls.get() + self.raw_calls.get()
    }

    fn tick(&self) -> usize {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        n
    }

    fn wrap(&self, plain: &PlainResource, encrypted_data: EncryptedData) -> SealedResource {
        let mut sealed = SealedResource::new(
            plain.metadata.name.clone(),
            plain.metadata.namespace.clone(),
        );
        sealed.metadata = plain.metadata.clone();
        sealed.spec = SealedSpec {
            template: SecretTemplate {
                metadata: plain.metadata.clone(),
                secret_type: plain.secret_type.clone(),
                immutable: plain.immutable,
                data: Default::default(),
            },
            encrypted_data,
        };
        sealed
    }
}

impl EncryptionGateway for FakeGateway {
    fn encrypt(&self, plain: &PlainResource) -> SealerResult<SealedResource> {
        self.full_calls.set(self.full_calls.get() + 1);
        if self.fail_full {
            return Err(SealerError::Encryption("fake full seal failure".into()));
        }
        let encrypted = plain
            .payload
            .iter()
            .map(|(k, v)| (k.clone(), format!("full#{}:{}", self.tick(), v)))
            .collect();
        Ok(self.wrap(plain, encrypted))
    }

    fn encrypt_skeleton(&self, plain: &PlainResource) -> SealerResult<SealedResource> {
        self.skeleton_calls.set(self.skeleton_calls.get() + 1);
        if self.fail_skeleton {
            return Err(SealerError::Encryption("fake skeleton failure".into()));
        }
        if !plain.payload.is_empty() {
            return Err(SealerError::Encryption(
                "skeleton must not carry payload".into(),
            ));
        }
        Ok(self.wrap(plain, EncryptedData::new()))
    }

    fn encrypt_raw(&self, value: &[u8], identity: &IdentityContext) -> SealerResult<String> {
        self.raw_calls.set(self.raw_calls.get() + 1);
        let value = String::from_utf8_lossy(value).to_string();
        if self.fail_raw_on.as_deref() == Some(value.as_str()) {
            return Err(SealerError::Encryption("fake raw failure".into()));
        }
        self.raw_identities.borrow_mut().push(identity.clone());
        Ok(format!(
            "raw#{}:{}:{}/{}:{}",
            self.tick(),
            identity.scope,
            identity.namespace.as_deref().unwrap_or("*"),
            identity.name.as_deref().unwrap_or("*"),
            value
        ))
    }

    fn decrypt(&self, sealed: &SealedResource, _keys: &KeyMaterial) -> SealerResult<PlainResource> {
        self.decrypt_calls.set(self.decrypt_calls.get() + 1);
        let mut plain = PlainResource::new(
            sealed.metadata.name.clone(),
            sealed.metadata.namespace.clone(),
        );
        plain.metadata = sealed.spec.template.metadata.clone();
        plain.secret_type = sealed.spec.template.secret_type.clone();
        plain.payload = self.plaintext.clone();
        Ok(plain)
    }
}

/// Key source that always succeeds (or always fails)
#[derive(Default)]
pub struct FakeKeySource {
    pub fail: bool,
    pub requested: RefCell<Vec<String>>,
}

impl KeySource for FakeKeySource {
    fn fetch_key_material(&self, admin_namespace: &str) -> SealerResult<KeyMaterial> {
        self.requested.borrow_mut().push(admin_namespace.to_string());
        if self.fail {
            return Err(SealerError::KeySource("fake key source failure".into()));
        }
        Ok(KeyMaterial::new(br#"{"items":[{}]}"#.to_vec()))
    }
}

/// Editing surface replaying scripted edits
///
/// Each call pops the next edit function, applied to the presented text.
#[derive(Default)]
pub struct FakeEditor {
    edits: RefCell<VecDeque<Box<dyn Fn(&str) -> SealerResult<String>>>>,
    pub seen: RefCell<Vec<String>>,
}

impl FakeEditor {
    /// Return the content unchanged
    pub fn unchanged() -> Self {
        Self::with(|s| Ok(s.to_string()))
    }

    /// Replace the content entirely
    pub fn replace_with(text: &str) -> Self {
        let text = text.to_string();
        Self::with(move |_| Ok(text.clone()))
    }

    pub fn with(edit: impl Fn(&str) -> SealerResult<String> + 'static) -> Self {
        let editor = Self::default();
        editor.then(edit);
        editor
    }

    /// Queue another edit for the next call
    pub fn then(&self, edit: impl Fn(&str) -> SealerResult<String> + 'static) -> &Self {
        self.edits.borrow_mut().push_back(Box::new(edit));
        self
    }
}

impl EditingSurface for FakeEditor {
    fn edit(&self, content: &[u8]) -> SealerResult<Vec<u8>> {
        let text = String::from_utf8_lossy(content).to_string();
        self.seen.borrow_mut().push(text.clone());
        let edit = self
            .edits
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| SealerError::EditAborted("no scripted edit left".into()))?;
        edit(&text).map(String::into_bytes)
    }
}
