//! Browser process handle: launch, navigate one tab, close.

#[cfg(feature = "render")]
pub(crate) use chromium::Session;

#[cfg(not(feature = "render"))]
pub(crate) use disabled::Session;

#[cfg(feature = "render")]
mod chromium {
    use crate::render::{RenderError, RenderOptions};
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use futures_util::StreamExt;

    /// A launched headless browser plus its CDP event pump.
    pub(crate) struct Session {
        browser: Browser,
        handler: tokio::task::JoinHandle<()>,
    }

    impl Session {
        /// Launch a headless browser.
        ///
        /// The browser uses a background task to handle Chrome DevTools
        /// Protocol events for as long as the session lives.
        pub(crate) async fn launch(opts: &RenderOptions) -> Result<Self, RenderError> {
            let mut builder = BrowserConfig::builder()
                .arg(format!("--user-agent={}", opts.user_agent))
                .request_timeout(opts.timeout);
            if let Some(path) = &opts.executable {
                builder = builder.chrome_executable(path);
            }

            let (browser, mut handler) = Browser::launch(builder.build().map_err(RenderError::BrowserLaunch)?)
                .await
                .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!("browser handler event error: {e}");
                        break;
                    }
                }
            });

            Ok(Self { browser, handler })
        }

        /// Open a tab, navigate, read the navigation's response status, close the tab.
        pub(crate) async fn navigate(&self, url: &str, opts: &RenderOptions) -> Result<u16, RenderError> {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;

            let navigation = tokio::time::timeout(opts.timeout, async {
                page.goto(url).await?;
                page.wait_for_navigation_response().await
            })
            .await;

            page.close().await.ok();

            let request = match navigation {
                Ok(Ok(request)) => request,
                Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
                Err(_) => return Err(RenderError::Timeout(opts.timeout.as_millis() as u64)),
            };

            request
                .as_ref()
                .and_then(|r| r.response.as_ref())
                .and_then(|r| u16::try_from(r.status).ok())
                .ok_or(RenderError::NoResponse)
        }

        pub(crate) async fn close(mut self) {
            if let Err(e) = self.browser.close().await {
                tracing::debug!("browser close failed: {e}");
            }
            self.handler.abort();
        }
    }
}

#[cfg(not(feature = "render"))]
mod disabled {
    use crate::render::{RenderError, RenderOptions};

    /// Placeholder used when the crate is built without headless browser support.
    pub(crate) struct Session;

    impl Session {
        pub(crate) async fn launch(_opts: &RenderOptions) -> Result<Self, RenderError> {
            Err(RenderError::Disabled)
        }

        pub(crate) async fn navigate(&self, _url: &str, _opts: &RenderOptions) -> Result<u16, RenderError> {
            Err(RenderError::Disabled)
        }

        pub(crate) async fn close(self) {}
    }
}
