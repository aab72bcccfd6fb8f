/// Asset loading on background threads
use std::path::PathBuf;
use std::thread;
use veeno_core::{Font, Loading, Matcap, Result, Texture};

/// Run `load` on a named thread and hand its result to the returned handle
pub fn spawn_loader<T, F>(name: &'static str, load: F) -> Loading<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (loading, resolver) = Loading::pending(name);
    let spawned = thread::Builder::new()
        .name(format!("{name}-loader"))
        .spawn(move || resolver.resolve(load()));
    if let Err(error) = spawned {
        // The resolver was dropped with the closure; polling reports it
        tracing::error!(asset = name, %error, "could not start loader thread");
    }
    loading
}

pub fn load_font(path: PathBuf) -> Loading<Font> {
    spawn_loader("font", move || {
        tracing::debug!(path = %path.display(), "reading font");
        Font::from_slice(&std::fs::read(&path)?)
    })
}

pub fn load_matcap(path: PathBuf) -> Loading<Matcap> {
    spawn_loader("matcap", move || {
        tracing::debug!(path = %path.display(), "reading matcap");
        Matcap::open(&path)
    })
}

pub fn load_toon_texture(path: PathBuf) -> Loading<Texture> {
    spawn_loader("toon texture", move || {
        tracing::debug!(path = %path.display(), "reading toon texture");
        Texture::open(&path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::task::Poll;
    use std::time::{Duration, Instant};
    use veeno_core::Error;

    fn wait<T>(loading: &mut Loading<T>) -> Result<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Poll::Ready(result) = loading.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader timed out");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_loads_shipped_font() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../assets/fonts/veeno.typeface.json");
        let font = wait(&mut load_font(path)).unwrap();
        assert!(font.glyph('v').is_some());
    }

    #[test]
    fn test_missing_files_resolve_to_errors() {
        let result = wait(&mut load_font(PathBuf::from("/nonexistent/font.json")));
        assert!(matches!(result, Err(Error::Io(_))));
        let result = wait(&mut load_matcap(PathBuf::from("/nonexistent/matcap.png")));
        assert!(result.is_err());
        let result = wait(&mut load_toon_texture(PathBuf::from("/nonexistent/7.png")));
        assert!(result.is_err());
    }
}
