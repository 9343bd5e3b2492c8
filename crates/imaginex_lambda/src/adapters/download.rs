use imaginex_core::source::FetchedImage;
use url::Url;

pub trait ImageDownloader {
    fn download(&self, url: &Url, chunk_size: usize) -> Result<FetchedImage, String>;
}
