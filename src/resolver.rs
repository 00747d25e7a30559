// Copyright 2026 The symbology Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::env;
use std::fs;
use std::io;

use url::Url;

/// Resolves and loads external resources referenced by `xlink:href`.
pub trait ResourceResolver: Send + Sync {
    /// Resolves `href` against the URL of the referencing document.
    fn resolve(&self, href: &str, base: Option<&Url>) -> io::Result<Url>;

    /// Loads the resource data.
    fn open(&self, url: &Url) -> io::Result<Vec<u8>>;
}

/// A resolver for local files.
///
/// Relative references without a base URL are resolved against
/// the current directory. Only `file:` URLs can be opened.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileResolver;

impl ResourceResolver for FileResolver {
    fn resolve(&self, href: &str, base: Option<&Url>) -> io::Result<Url> {
        let href = href.trim();
        let base = match base {
            Some(base) => base.clone(),
            None => {
                let dir = env::current_dir()?;
                Url::from_directory_path(&dir).map_err(|_| invalid_url(&dir.to_string_lossy()))?
            }
        };

        base.join(href).map_err(|_| invalid_url(href))
    }

    fn open(&self, url: &Url) -> io::Result<Vec<u8>> {
        if url.scheme() != "file" {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("unsupported URL scheme '{}'", url.scheme()),
            ));
        }

        let path = url.to_file_path().map_err(|_| invalid_url(url.as_str()))?;
        fs::read(path)
    }
}

fn invalid_url(url: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("invalid URL '{}'", url))
}
