use crate::classify::{self, decode_issue, fetch_issue};
use crate::dimensions;
use crate::error::{PageError, RecognizeError, ValidatorError};
use crate::filter::ExclusionFilter;
use crate::hash::resource_id;
use crate::ocr::matcher;
use crate::ocr::{Dictionary, TextRecognizer};
use crate::parsers::{ImageTag, html};
use crate::resolver::{self, ResolvedSrc};
use crate::results::{ImageResource, Issue, PageResult, Report};
use crate::sources::{ImageTransport, PageSource};
use crate::utils::as_millis;
use std::future::Future;
use std::time::{Duration, Instant};

/// Result of a whole run: every page seen so far, and the error that stopped it, if any
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub error: Option<ValidatorError>,
}

/// Per-page, per-image validation.
///
/// Strictly sequential: one seed at a time, one image at a time.
pub struct Pipeline {
    pub(crate) allow_duplicates: bool,
    pub(crate) image_timeout: Duration,
    pub(crate) exclusions: ExclusionFilter,
    pub(crate) pages: Box<dyn PageSource>,
    pub(crate) transport: Box<dyn ImageTransport>,
    pub(crate) recognizer: Box<dyn TextRecognizer>,
    pub(crate) dictionary: Box<dyn Dictionary>,
}

impl Pipeline {
    /// Validate every seed, treating Ctrl-C as the end of the current page
    pub async fn run(&self, seeds: &[String]) -> RunOutcome {
        self.run_with_interrupt(seeds, || async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal handler available; never interrupt
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Validate every seed, ending the current page whenever `interrupt` resolves.
    ///
    /// A page that cannot be fetched is skipped. A fatal error stops the run;
    /// the report still holds everything recorded up to that point.
    pub async fn run_with_interrupt<F, Fut>(&self, seeds: &[String], mut interrupt: F) -> RunOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        ::log::info!("URLS = {:?}", seeds);
        let mut report = Report::new();

        for url in seeds {
            let mut page = PageResult::new(url.clone());
            ::log::info!("[{}] URL Resource Id: {} Fetching source ...", url, page.page_id());

            let status = {
                let work = self.validate_page(&mut page);
                tokio::select! {
                    biased;
                    _ = interrupt() => None,
                    result = work => Some(result),
                }
            };
            report.record(page);

            match status {
                None => ::log::warn!("[{}] Interrupted!", url),
                Some(Ok(())) => ::log::info!("[{}] Done", url),
                Some(Err(PageError::Abandoned(e))) => {
                    ::log::error!("[{}] {} ... skipping this URL", url, e);
                }
                Some(Err(PageError::Fatal(e))) => {
                    ::log::error!("[{}] An unrecoverable error occurred: {}", url, e);
                    self.pages.close().await;
                    return RunOutcome {
                        report,
                        error: Some(e),
                    };
                }
            }
        }

        self.pages.close().await;
        RunOutcome {
            report,
            error: None,
        }
    }

    /// Fetch, parse and validate a single page into `page`
    pub async fn validate_page(&self, page: &mut PageResult) -> Result<(), PageError> {
        let url = page.url.clone();

        let start = Instant::now();
        let html = self.pages.fetch_page(&url).await?;
        let download_time = start.elapsed().as_secs_f64();
        page.metrics.download_time = Some(download_time);

        ::log::info!("[{}] Parsing HTML ...", url);
        let start = Instant::now();
        let parsed = html::parse_with_exclusions(&html, &self.exclusions);
        let parse_time = start.elapsed().as_secs_f64();
        page.metrics.parse_time = Some(parse_time);
        page.metrics.total_images = Some(parsed.total_images());

        ::log::info!(
            "[{}] Found {} <img> tags (download = {}ms, parse = {}ms) ...",
            url,
            parsed.total_images(),
            as_millis(download_time),
            as_millis(parse_time)
        );

        for tag in parsed.images {
            self.validate_image(page, tag).await?;
        }

        Ok(())
    }

    async fn validate_image(
        &self,
        page: &mut PageResult,
        tag: ImageTag,
    ) -> Result<(), ValidatorError> {
        let Some(src) = tag.src else {
            ::log::debug!("[{}] - Skipping <img> without src at {}", page.url, tag.css_path);
            return Ok(());
        };

        let (url, resolve_issues, skipped) = match resolver::resolve(&page.url, &src) {
            ResolvedSrc::DataUri => (src, Vec::new(), true),
            ResolvedSrc::Url { url, issues } => (url, issues, false),
        };

        let id = resource_id(&url);
        if !self.allow_duplicates && page.contains_resource(&id) {
            ::log::debug!("[{}] - Skipping duplicate resource_id {} for {}", page.url, id, url);
            return Ok(());
        }

        let index = page.resources.len();
        page.resources.push(ImageResource::new(id, url, tag.alt, tag.css_path));
        let resource = &mut page.resources[index];

        if skipped {
            ::log::info!("[{}] - Ignoring Base64 encoded image at {}", page.url, resource.css_path);
            resource.skipped = true;
            return Ok(());
        }

        resource.extend_issues(resolve_issues);

        if resource.alt.as_deref().is_none_or(|alt| alt.trim().is_empty()) {
            ::log::info!("[{}] - Empty alt attribute for {}", page.url, resource.url);
            resource.push_issue(Issue::warn("Alt attribute is empty."));
        }

        self.inspect(resource).await
    }

    /// Fetch, classify, decode and OCR one image, recording what was found
    async fn inspect(&self, resource: &mut ImageResource) -> Result<(), ValidatorError> {
        ::log::info!("- Validating source {} ...", resource.url);

        let classified = match classify::fetch_and_classify(
            self.transport.as_ref(),
            &resource.url,
            self.image_timeout,
        )
        .await
        {
            Ok(classified) => classified,
            Err(e) => {
                ::log::warn!("- {} for {}", e, resource.url);
                resource.push_issue(fetch_issue(&e));
                return Ok(());
            }
        };

        resource.download_time = Some(classified.download_time);
        resource.content_type = classified.content_type;
        resource.rasterized = classified.rasterized;
        resource.extend_issues(classified.issues);

        let Some(bytes) = classified.bytes else {
            return Ok(());
        };

        let image = match classify::decode(&bytes) {
            Ok(image) => image,
            Err(e) => {
                ::log::warn!("- Cannot decode {}: {}", resource.url, e);
                resource.push_issue(decode_issue(&e));
                return Ok(());
            }
        };
        drop(bytes);

        resource.width = Some(image.width());
        resource.height = Some(image.height());
        resource.extend_issues(dimensions::reconcile(&resource.url, image.width(), image.height()));

        let matched = matcher::analyze(
            self.recognizer.as_ref(),
            self.dictionary.as_ref(),
            &image,
            resource.alt.as_deref(),
        )
        .await;

        match matched {
            Ok(matched) => {
                resource.analyzed_text = Some(matched.analyzed_text);
                resource.extend_issues(matched.issues);
                Ok(())
            }
            Err(RecognizeError::Image(msg)) => {
                ::log::warn!("- Cannot run OCR on {}: {}", resource.url, msg);
                resource.push_issue(Issue::error(format!(
                    "Image could not be prepared for OCR: {}.",
                    msg
                )));
                Ok(())
            }
            Err(RecognizeError::Engine(e)) => Err(e),
        }
    }
}
