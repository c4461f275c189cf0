/*!
 * Common test utilities for the mdlingo test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use mdlingo::app_config::Config;
use mdlingo::providers::mock::MockProvider;
use mdlingo::translation::TranslationService;

/// A document with prose, two code blocks and a blank line inside one of them
pub const SAMPLE_MARKDOWN: &str = r#"# Getting started

Install the package and import it.

```js
import { render } from 'lib';

render(<App />);
```

Then call it from your code:

~~~
plain block
~~~

That's all.
"#;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A configuration that passes validation
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.api.api_key = "sk-test".to_string();
    config
}

/// A translation service backed by the given mock
pub fn mock_service(config: Config, provider: &MockProvider) -> TranslationService {
    TranslationService::with_caller(config, Arc::new(provider.clone()))
        .expect("mock service should build")
}

/// Enable log output for a test run with RUST_LOG set
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
