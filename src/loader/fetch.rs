//! Reading asset files in the background.

use super::pending::{loading_channel, Loading, Resolver};
use crate::error::LoadError;
use std::path::PathBuf;

/// Reads every file in `paths` in the background, then hands their bytes to
/// `decode`.
///
/// On native targets the reading and decoding run on a worker thread. On the
/// web the files are fetched relative to the page and decoded on the main
/// thread once they all arrived. Either way the result is picked up by
/// polling the returned [`Loading`].
pub fn load_async<T, F>(paths: Vec<PathBuf>, decode: F) -> Loading<T>
where
    T: Send + 'static,
    F: FnOnce(Vec<Vec<u8>>) -> Result<T, LoadError> + Send + 'static,
{
    let (resolver, loading) = loading_channel();
    spawn_load(paths, decode, resolver);
    loading
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_load<T, F>(paths: Vec<PathBuf>, decode: F, resolver: Resolver<T>)
where
    T: Send + 'static,
    F: FnOnce(Vec<Vec<u8>>) -> Result<T, LoadError> + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("turntable-loader".to_string())
        .spawn(move || {
            let result = paths
                .iter()
                .map(|path| {
                    log::debug!("reading {}", path.display());
                    std::fs::read(path).map_err(|source| LoadError::Io {
                        path: path.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .and_then(decode);
            resolver.resolve(result);
        });

    // The resolver went down with the closure, the load reports `Abandoned`.
    if let Err(e) = spawned {
        log::error!("failed to spawn the loader thread: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn_load<T, F>(paths: Vec<PathBuf>, decode: F, resolver: Resolver<T>)
where
    T: Send + 'static,
    F: FnOnce(Vec<Vec<u8>>) -> Result<T, LoadError> + Send + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            match fetch_bytes(path).await {
                Ok(bytes) => files.push(bytes),
                Err(e) => {
                    resolver.resolve(Err(e));
                    return;
                }
            }
        }
        resolver.resolve(decode(files));
    });
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(path: &std::path::Path) -> Result<Vec<u8>, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |message: String| LoadError::Fetch {
        path: path.to_path_buf(),
        message,
    };

    let window = web_sys::window().ok_or_else(|| fetch_error("no browser window".to_string()))?;
    let url = path.to_string_lossy();
    log::debug!("fetching {}", url);

    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|e| fetch_error(format!("{:?}", e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|e| fetch_error(format!("{:?}", e)))?;

    if !response.ok() {
        return Err(fetch_error(format!("HTTP status {}", response.status())));
    }

    let buffer = response
        .array_buffer()
        .map_err(|e| fetch_error(format!("{:?}", e)))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| fetch_error(format!("{:?}", e)))?;

    Ok(web_sys::js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait<T>(loading: &mut Loading<T>) -> Result<T, LoadError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = loading.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "the loader never finished");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn files_are_read_and_decoded_in_order() {
        let dir = std::env::temp_dir().join(format!("turntable-fetch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.txt");
        let b = dir.join("b.txt");
        std::fs::write(&a, b"left").unwrap();
        std::fs::write(&b, b"right").unwrap();

        let mut loading = load_async(vec![a, b], |files| {
            Ok(files
                .into_iter()
                .map(|f| String::from_utf8(f).unwrap())
                .collect::<Vec<_>>())
        });

        assert_eq!(wait(&mut loading).unwrap(), vec!["left", "right"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_files_fail_the_load() {
        let missing = std::env::temp_dir().join("turntable-definitely-missing.obj");
        let mut loading = load_async(vec![missing.clone()], |_| Ok(()));

        match wait(&mut loading) {
            Err(LoadError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
