use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use eyre::{eyre, WrapErr};
use poem::http::StatusCode;
use poem::{get, Endpoint, Request, Response, Route};
use tracing::{error, instrument, trace};

use crate::core::config::SiteConfig;
use crate::core::files::FileTree;
use crate::core::page::Page;
use crate::core::seo::TemplateData;
use crate::render::Renderer;
use crate::{util, Result};

const NOT_FOUND_BODY: &str = "404 page not found";

/// Renders a page into an HTTP response.
///
/// Any failure produces an empty `500` response and a single error event
/// naming the page.
pub fn render_response(renderer: &Renderer, name: &str, data: TemplateData) -> Response {
    match renderer.render(name, data) {
        Ok(html) => Response::builder()
            .content_type(mime::TEXT_HTML_UTF_8.as_ref())
            .body(html),
        Err(e) => {
            error!(page = %name, err = %util::error_chain(&e), "error while rendering template");
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .finish()
        }
    }
}

/// Pages registered against one renderer, served over poem.
#[derive(Debug)]
pub struct Site {
    renderer: Arc<Renderer>,
    pages: Vec<Page>,
    routes: HashSet<String>,
    not_found: Option<Page>,
}

impl Site {
    pub fn new(config: SiteConfig, files: Arc<dyn FileTree>) -> Result<Self> {
        let renderer = Renderer::new(Arc::new(config), files)?;
        Ok(Self::with_renderer(Arc::new(renderer)))
    }

    pub fn with_renderer(renderer: Arc<Renderer>) -> Self {
        Self {
            renderer,
            pages: vec![],
            routes: HashSet::new(),
            not_found: None,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[instrument(skip_all, fields(name = %page.name(), url = %page.url()))]
    pub fn page(&mut self, page: Page) -> Result<&mut Self> {
        let url = page.url();
        if !url.starts_with('/') {
            return Err(eyre!(
                "route '{}' for page '{}' must start with '/'",
                url,
                page.name()
            ));
        }
        if !self.routes.insert(url.clone()) {
            return Err(eyre!(
                "route '{}' for page '{}' is already registered",
                url,
                page.name()
            ));
        }
        trace!("registered page");
        self.pages.push(page);
        Ok(self)
    }

    /// Registers a page with only a name and a title at `/<name>`.
    pub fn simple_page<N: Into<String>, T: Into<String>>(
        &mut self,
        name: N,
        title: T,
    ) -> Result<&mut Self> {
        self.page(Page::new(name, title))
    }

    /// Page rendered with status `404` for unmatched requests. Its route is
    /// ignored.
    pub fn not_found_page(&mut self, page: Page) -> &mut Self {
        self.not_found = Some(page);
        self
    }

    /// Compiles every registered page once and builds the route table.
    pub fn into_endpoint(self) -> Result<SiteEndpoint> {
        let names = self
            .pages
            .iter()
            .chain(self.not_found.iter())
            .map(Page::name)
            .collect::<HashSet<_>>();
        self.renderer.store().verify(names)?;

        let mut route = Route::new();
        for page in self.pages {
            let url = page.url();
            route = route.at(
                url,
                get(PageEndpoint {
                    page,
                    renderer: Arc::clone(&self.renderer),
                }),
            );
        }

        Ok(SiteEndpoint {
            route,
            renderer: self.renderer,
            not_found: self.not_found,
        })
    }

    pub async fn run(self, bind: SocketAddr) -> Result<()> {
        use poem::listener::TcpListener;
        use poem::Server;

        let app = self.into_endpoint()?;
        trace!(bind = %bind, "starting server");
        Server::new(TcpListener::bind(bind.to_string()))
            .run(app)
            .await
            .wrap_err_with(|| format!("Server failed on '{}'", bind))
    }
}

struct PageEndpoint {
    page: Page,
    renderer: Arc<Renderer>,
}

#[async_trait::async_trait]
impl Endpoint for PageEndpoint {
    type Output = Response;

    async fn call(&self, _req: Request) -> poem::Result<Self::Output> {
        Ok(render_response(
            &self.renderer,
            self.page.name(),
            self.page.template_data(),
        ))
    }
}

/// Route table for every registered page, answering unknown paths with `404`.
pub struct SiteEndpoint {
    route: Route,
    renderer: Arc<Renderer>,
    not_found: Option<Page>,
}

impl SiteEndpoint {
    fn not_found(&self) -> Response {
        match &self.not_found {
            Some(page) => {
                let mut response =
                    render_response(&self.renderer, page.name(), page.template_data());
                if response.status().is_success() {
                    response.set_status(StatusCode::NOT_FOUND);
                }
                response
            }
            None => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .content_type(mime::TEXT_PLAIN_UTF_8.as_ref())
                .body(NOT_FOUND_BODY),
        }
    }
}

#[async_trait::async_trait]
impl Endpoint for SiteEndpoint {
    type Output = Response;

    async fn call(&self, req: Request) -> poem::Result<Self::Output> {
        match self.route.call(req).await {
            Err(e) if e.status() == StatusCode::NOT_FOUND => Ok(self.not_found()),
            other => other,
        }
    }
}
