// GraphQL documents sent to the CMS. Listing is not filtered server side; the
// client narrows results to the requested locale.

pub const GET_NEWS_BY_LANGUAGE: &str = r#"
query GetNewsByLanguage($first: Int = 10) {
  nodeNewsArticles(first: $first, sortKey: CREATED_AT) {
    nodes {
      id
      title
      path
      created {
        timestamp
      }
      changed {
        timestamp
      }
      ... on NodeNewsArticle {
        summary {
          processed
        }
        body {
          processed
        }
        image {
          url
          alt
          width
          height
          variations(styles: [LARGE, MEDIUM, THUMBNAIL]) {
            name
            url
            width
            height
          }
        }
        language {
          ... on TermLanguage {
            id
            name
            code
          }
        }
      }
    }
  }
}
"#;

pub const GET_NEWS_BY_PATH: &str = r#"
query GetNewsByPath($path: String!) {
  route(path: $path) {
    ... on RouteInternal {
      entity {
        ... on NodeNewsArticle {
          id
          title
          path
          langcode {
            id
          }
          created {
            timestamp
          }
          changed {
            timestamp
          }
          summary {
            processed
          }
          body {
            processed
          }
          image {
            url
            alt
            width
            height
            variations(styles: [LARGE, MEDIUM, THUMBNAIL]) {
              name
              url
              width
              height
            }
          }
          language {
            ... on TermLanguage {
              id
              name
              code
            }
          }
          translations {
            path
            langcode {
              id
            }
          }
        }
      }
    }
  }
}
"#;
