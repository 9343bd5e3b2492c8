use imaginex_core::source::FetchedImage;

pub trait ImageObjectStore {
    fn get_object(&self, bucket: &str, key: &str, chunk_size: usize) -> Result<FetchedImage, String>;
}
