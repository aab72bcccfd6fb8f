/// Asset downloads resolved into [`Loading`] handles
use js_sys::Uint8Array;
use std::io;
use veeno_core::{Font, Loading, Matcap, Result, Texture};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::Response;

/// Fetch `url` in the background and parse it with `parse`
pub fn fetch_asset<T: 'static>(name: &'static str, url: String, parse: fn(&[u8]) -> Result<T>) -> Loading<T> {
    let (loading, resolver) = Loading::pending(name);
    spawn_local(async move {
        tracing::debug!(asset = name, %url, "fetching");
        let result = match fetch_bytes(&url).await {
            Ok(bytes) => parse(&bytes),
            Err(error) => Err(io::Error::new(io::ErrorKind::Other, format!("{url}: {}", describe(&error))).into()),
        };
        resolver.resolve(result);
    });
    loading
}

pub fn fetch_font(url: &str) -> Loading<Font> {
    fetch_asset("font", url.to_string(), Font::from_slice)
}

pub fn fetch_matcap(url: &str) -> Loading<Matcap> {
    fetch_asset("matcap", url.to_string(), Matcap::from_bytes)
}

pub fn fetch_toon_texture(url: &str) -> Loading<Texture> {
    fetch_asset("toon texture", url.to_string(), Texture::from_bytes)
}

async fn fetch_bytes(url: &str) -> std::result::Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Readable text for a rejected promise
pub fn describe(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| error.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{error:?}"))
}
