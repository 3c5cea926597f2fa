use pagewrightlib::{MemoryTree, Page, SeoData, Site, SiteConfig};
use serial_test::serial;
use std::net::SocketAddr;
use std::sync::Arc;

fn site() -> Site {
    let tree = MemoryTree::new()
        .with_file(
            "base.tera",
            r#"<meta property="og:image" content="{{ seo.image | safe }}">{% block body %}{% endblock body %}"#,
        )
        .with_file("page/home.tera", "{% block body %}home{% endblock body %}")
        .with_file(
            "page/broken.tera",
            "{% block body %}{{ data.missing }}{% endblock body %}",
        );

    let config = SiteConfig::builder()
        .template("base.tera")
        .default_seo(SeoData {
            domain: "ex.com".into(),
            image: "default.png".into(),
            ..Default::default()
        })
        .build();

    let mut site = Site::new(config, Arc::new(tree)).unwrap();
    site.page(Page::new("home", "Home").route("/").image("logo.png"))
        .unwrap()
        .simple_page("broken", "Broken")
        .unwrap();
    site
}

#[tokio::test]
#[serial]
async fn serves_over_tcp() {
    let addr: SocketAddr = "127.0.0.1:38484".parse().unwrap();
    tokio::spawn(site().run(addr));

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let response = reqwest::get("http://127.0.0.1:38484/").await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.text().await.unwrap(),
        r#"<meta property="og:image" content="/static/logo.png">home"#
    );

    let response = reqwest::get("http://127.0.0.1:38484/broken").await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);

    let response = reqwest::get("http://127.0.0.1:38484/nope").await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
