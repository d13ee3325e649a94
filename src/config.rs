use crate::error::Error;
use std::path::PathBuf;

/// Validated startup configuration: the ordered list of image files to load,
/// in the order given on the command line.
#[derive(Debug, PartialEq)]
pub struct Config {
    pub images: Vec<PathBuf>,
}

impl Config {
    /// Builds a `Config` from the image paths the CLI collected. At least
    /// one image is required.
    pub fn with(images: Vec<PathBuf>) -> Result<Self, Error> {
        if images.is_empty() {
            return Err(Error::Usage);
        }

        Ok(Config { images })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_image_is_valid() {
        let config = Config::with(vec![PathBuf::from("program.obj")]).unwrap();
        assert_eq!(config.images, vec![PathBuf::from("program.obj")]);
    }

    #[test]
    fn multiple_images_preserve_order() {
        let images = vec![PathBuf::from("a.obj"), PathBuf::from("b.obj")];
        let config = Config::with(images.clone()).unwrap();
        assert_eq!(config.images, images);
    }

    #[test]
    fn no_images_is_a_usage_error() {
        assert!(matches!(Config::with(vec![]), Err(Error::Usage)));
    }
}
