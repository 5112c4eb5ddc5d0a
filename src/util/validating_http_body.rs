use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{ready, Stream};
use hyper::Body;
use pin_project_lite::pin_project;
use sha1::{Digest, Sha1};
use tracing::trace;

use crate::error::FetchError;

pin_project! {
    /// This struct wraps an HTTP body, allowing it to be consumed asynchronously without materializing
    ///  it but at the same time performing validation that requires knowledge of the entire body's
    ///  data (e.g. SHA1 checksum check).
    ///
    /// The actual contract is to append an (empty) chunk of data to the stream with an error if the
    ///  validation fails. Once a stream chunk with an error was returned, this stream will stop
    ///  polling from upstream and always return an error.
    pub struct ValidatingHttpBody {
        #[pin]
        http_body: Body,
        url: String,
        validator: Box<dyn HttpBodyValidator>,
        is_failed: bool,
    }
}
impl ValidatingHttpBody {
    pub fn new(url: &str, http_body: Body, validator: impl HttpBodyValidator + 'static) -> ValidatingHttpBody {
        ValidatingHttpBody {
            http_body,
            url: url.to_string(),
            validator: Box::new(validator),
            is_failed: false,
        }
    }
}

impl Stream for ValidatingHttpBody {
    type Item = Result<Bytes, FetchError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.is_failed {
            return Poll::Ready(Some(Err(FetchError::Transport {
                url: this.url.clone(),
                message: "polling from failed stream".to_string(),
            })));
        }

        let inner = ready!(this.http_body.poll_next(cx));
        match inner {
            Some(Ok(data)) => {
                // available data from the wrapped HTTP body -> pass this on
                this.validator.add_data(&data);
                Poll::Ready(Some(Ok(data)))
            }
            None => {
                // wrapped HTTP body is fully drained -> finalize validation
                match this.validator.do_validate() {
                    Ok(()) => Poll::Ready(None),
                    Err(mismatch) => {
                        *this.is_failed = true;
                        Poll::Ready(Some(Err(FetchError::ChecksumMismatch {
                            url: this.url.clone(),
                            expected: mismatch.expected,
                            actual: mismatch.actual,
                        })))
                    }
                }
            }
            Some(Err(e)) => {
                *this.is_failed = true;
                Poll::Ready(Some(Err(FetchError::Transport {
                    url: this.url.clone(),
                    message: e.to_string(),
                })))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.http_body.size_hint()
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct DigestMismatch {
    pub expected: String,
    pub actual: String,
}

pub trait HttpBodyValidator: Send {
    fn add_data(&mut self, data: &Bytes);
    fn do_validate(&self) -> Result<(), DigestMismatch>;
}

pub struct Sha1HttpBodyValidator {
    hasher: Sha1,
    expected_hash: [u8; 20],
}
impl Sha1HttpBodyValidator {
    pub fn new(expected_hash: [u8; 20]) -> Sha1HttpBodyValidator {
        Sha1HttpBodyValidator {
            hasher: Default::default(),
            expected_hash,
        }
    }
}
impl HttpBodyValidator for Sha1HttpBodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.hasher.update(data);
    }

    fn do_validate(&self) -> Result<(), DigestMismatch> {
        let hash: [u8; 20] = self.hasher.clone().finalize().into();
        trace!("validating SHA1 hash");
        if hash == self.expected_hash {
            Ok(())
        }
        else {
            Err(DigestMismatch {
                expected: hex::encode(self.expected_hash),
                actual: hex::encode(hash),
            })
        }
    }
}

#[cfg(test)]
mod test {
    use futures::StreamExt;

    use super::*;
    use crate::util::checksum::sha1_hex;

    fn chunked_body(chunks: &[&'static [u8]]) -> Body {
        let chunks: Vec<Result<Bytes, std::io::Error>> = chunks.iter()
            .map(|c| Ok(Bytes::from_static(c)))
            .collect();
        Body::wrap_stream(futures::stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_valid_body_passes_all_chunks() {
        let validator = Sha1HttpBodyValidator::new(Sha1::digest(b"hello world").into());
        let mut body = ValidatingHttpBody::new("http://x/y", chunked_body(&[b"hello", b" ", b"world"]), validator);

        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(data, b"hello world");
    }

    #[tokio::test]
    async fn test_invalid_body_ends_with_mismatch() {
        let validator = Sha1HttpBodyValidator::new(Sha1::digest(b"something else").into());
        let mut body = ValidatingHttpBody::new("http://x/y", chunked_body(&[b"hello", b" world"]), validator);

        assert_eq!(&body.next().await.unwrap().unwrap()[..], b"hello");
        assert_eq!(&body.next().await.unwrap().unwrap()[..], b" world");
        match body.next().await {
            Some(Err(FetchError::ChecksumMismatch { url, expected, actual })) => {
                assert_eq!(url, "http://x/y");
                assert_eq!(expected, sha1_hex(b"something else"));
                assert_eq!(actual, sha1_hex(b"hello world"));
            }
            _ => panic!("expected a checksum mismatch"),
        }

        // a failed stream stays failed
        assert!(matches!(body.next().await, Some(Err(_))));
    }

    #[test]
    fn test_validator_reports_hex_digests() {
        let mut validator = Sha1HttpBodyValidator::new([0u8; 20]);
        validator.add_data(&Bytes::from_static(b"hello world"));
        let mismatch = validator.do_validate().unwrap_err();
        assert_eq!(mismatch.expected, "0".repeat(40));
        assert_eq!(mismatch.actual, sha1_hex(b"hello world"));
    }
}
