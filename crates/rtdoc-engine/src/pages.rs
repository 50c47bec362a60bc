//! # Reference pages
//!
//! Each category of the documented subsystem gets one generated page. A page
//! is a template file (`ref_<name>.rst.template`) with a `{<name>}` field,
//! filled with the converted describe text and written to
//! `<output_dir>/ref_<name>.rst` before the documentation build reads it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;

use log::{debug, info};

use crate::convert::{ConvertError, DocConverter};
use crate::describe::{DescribeError, DescribeSource};
use crate::io::{IoError, read_file, write_file};

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Describe(#[from] DescribeError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("Template error: {0}")]
    Template(String),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("Page generation for {0} panicked")]
    Panicked(Category),
}

/// Documentation lists the described subsystem can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Architectures,
    Options,
    Passes,
    Resources,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Architectures,
        Category::Options,
        Category::Passes,
        Category::Resources,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Architectures => "architectures",
            Category::Options => "options",
            Category::Passes => "passes",
            Category::Resources => "resources",
        }
    }

    /// The template field that receives the converted text.
    pub fn placeholder(self) -> &'static str {
        self.name()
    }

    pub fn template_file(self) -> String {
        format!("ref_{}.rst.template", self.name())
    }

    pub fn output_file(self) -> String {
        format!("ref_{}.rst", self.name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
                format!("unknown category '{s}', expected one of {}", known.join(", "))
            })
    }
}

/// Fills the `{placeholder}` fields of `template` with `value`.
///
/// `{{` and `}}` stand for literal braces. Any other field, or a brace
/// without its partner, is an error, as is a template that never uses the
/// placeholder.
pub fn fill_template(template: &str, placeholder: &str, value: &str) -> Result<String, PageError> {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut rest = template;
    let mut filled = false;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if tail.starts_with('}') {
            return Err(PageError::Template(format!(
                "single '}}' at byte {} of template",
                template.len() - tail.len()
            )));
        } else {
            let Some(close) = tail.find('}') else {
                return Err(PageError::Template(format!(
                    "unmatched '{{' at byte {} of template",
                    template.len() - tail.len()
                )));
            };
            let field = &tail[1..close];
            if field != placeholder {
                return Err(PageError::Template(format!(
                    "unknown field '{{{field}}}', expected '{{{placeholder}}}'"
                )));
            }
            out.push_str(value);
            filled = true;
            rest = &tail[close + 1..];
        }
    }
    out.push_str(rest);

    if !filled {
        return Err(PageError::Template(format!(
            "template never uses '{{{placeholder}}}'"
        )));
    }
    Ok(out)
}

/// Renders category pages from templates and writes them to the output directory.
pub struct PageGenerator {
    templates_dir: PathBuf,
    output_dir: PathBuf,
    header_level: usize,
    converter: DocConverter,
}

impl PageGenerator {
    pub fn new(
        templates_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        header_level: usize,
        converter: DocConverter,
    ) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            output_dir: output_dir.into(),
            header_level,
            converter,
        }
    }

    pub fn output_path(&self, category: Category) -> PathBuf {
        self.output_dir.join(category.output_file())
    }

    /// Produces the page text for `category` without writing it.
    pub fn render(
        &self,
        category: Category,
        source: &dyn DescribeSource,
    ) -> Result<String, PageError> {
        let text = source.describe(category)?;
        let rst = self.converter.convert(&text, self.header_level)?;

        let template_path = self.templates_dir.join(category.template_file());
        let template = read_file(&template_path)?;
        debug!(
            "filling {} with {} bytes of rst",
            template_path.display(),
            rst.len()
        );
        fill_template(&template, category.placeholder(), &rst)
    }

    /// Renders `category` and writes `ref_<name>.rst`, returning its path.
    pub fn generate(
        &self,
        category: Category,
        source: &dyn DescribeSource,
    ) -> Result<PathBuf, PageError> {
        let page = self.render(category, source)?;
        let path = self.output_path(category);
        write_file(&path, &page)?;
        info!("generated {}", path.display());
        Ok(path)
    }

    /// Generates every category in parallel, one result per category in input order.
    pub fn generate_all(
        &self,
        source: &dyn DescribeSource,
        categories: &[Category],
    ) -> Vec<(Category, Result<PathBuf, PageError>)> {
        thread::scope(|scope| {
            let handles: Vec<_> = categories
                .iter()
                .map(|&category| {
                    (
                        category,
                        scope.spawn(move || self.generate(category, source)),
                    )
                })
                .collect();

            handles
                .into_iter()
                .map(|(category, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or(Err(PageError::Panicked(category)));
                    (category, result)
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::StaticSource;
    use crate::tests::{create_test_dir, create_test_file};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("architectures", Category::Architectures)]
    #[case("Options", Category::Options)]
    #[case(" passes ", Category::Passes)]
    #[case("RESOURCES", Category::Resources)]
    fn parses_category_names(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn unknown_category_lists_known_ones() {
        let err = "targets".parse::<Category>().unwrap_err();
        assert_eq!(
            err,
            "unknown category 'targets', expected one of architectures, options, passes, resources"
        );
    }

    #[test]
    fn category_file_names() {
        assert_eq!(Category::Passes.template_file(), "ref_passes.rst.template");
        assert_eq!(Category::Passes.output_file(), "ref_passes.rst");
        assert_eq!(Category::Options.placeholder(), "options");
    }

    #[test]
    fn fills_placeholder_and_unescapes_braces() {
        let template = "Passes\n======\n\n{passes}\n\nUse {{braces}} literally.\n";
        let page = fill_template(template, "passes", "body\n").unwrap();
        assert_eq!(page, "Passes\n======\n\nbody\n\n\nUse {braces} literally.\n");
    }

    #[test]
    fn fills_every_occurrence() {
        let page = fill_template("{x} and {x}", "x", "v").unwrap();
        assert_eq!(page, "v and v");
    }

    #[rstest]
    #[case("{other}", "unknown field '{other}', expected '{passes}'")]
    #[case("{passes} {", "unmatched '{' at byte 9 of template")]
    #[case("{passes} }", "single '}' at byte 9 of template")]
    #[case("no field", "template never uses '{passes}'")]
    #[case("{}", "unknown field '{}', expected '{passes}'")]
    fn template_errors(#[case] template: &str, #[case] message: &str) {
        let err = fill_template(template, "passes", "v").unwrap_err();
        assert_eq!(err.to_string(), format!("Template error: {message}"));
    }

    fn generator(templates: &Path, output: &Path) -> PageGenerator {
        PageGenerator::new(templates, output, 2, DocConverter::default())
    }

    #[test]
    fn generates_page_from_template() {
        // Given a template and describe text for one category
        let dir = create_test_dir();
        create_test_file(
            &dir,
            "ref_passes.rst.template",
            "Passes\n======\n\n{passes}",
        );
        let source = StaticSource::new().with(
            Category::Passes,
            "* Transform Passes *\n  Simplify the `graph`.\n",
        );

        // When generating the page
        let output = dir.path().join("gen");
        let path = generator(dir.path(), &output)
            .generate(Category::Passes, &source)
            .unwrap();

        // Then it is written below the output directory with the converted text
        assert_eq!(path, output.join("ref_passes.rst"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Passes\n======\n\nTransform Passes\n----------------\n\nSimplify the ``graph``.\n"
        );
    }

    #[test]
    fn missing_text_fails_without_writing() {
        let dir = create_test_dir();
        create_test_file(&dir, "ref_options.rst.template", "{options}");
        let output = dir.path().join("gen");

        let err = generator(dir.path(), &output)
            .generate(Category::Options, &StaticSource::new())
            .unwrap_err();

        assert!(matches!(
            err,
            PageError::Describe(DescribeError::Unavailable(Category::Options))
        ));
        assert!(!output.join("ref_options.rst").exists());
    }

    #[test]
    fn missing_template_is_an_io_error() {
        let dir = create_test_dir();
        let source = StaticSource::new().with(Category::Resources, "text");

        let err = generator(dir.path(), dir.path())
            .render(Category::Resources, &source)
            .unwrap_err();

        assert!(matches!(err, PageError::Io(IoError::NotFound(_))));
    }

    struct PanickingSource;

    impl DescribeSource for PanickingSource {
        fn describe(&self, category: Category) -> Result<String, DescribeError> {
            panic!("describe {category} blew up");
        }
    }

    #[test]
    fn generate_all_reports_panicked_category() {
        let dir = create_test_dir();
        let results =
            generator(dir.path(), dir.path()).generate_all(&PanickingSource, &[Category::Passes]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, Category::Passes);
        assert!(matches!(
            results[0].1,
            Err(PageError::Panicked(Category::Passes))
        ));
        assert_eq!(
            results[0].1.as_ref().unwrap_err().to_string(),
            "Page generation for passes panicked"
        );
    }

    #[test]
    fn generate_all_reports_each_category() {
        let dir = create_test_dir();
        for category in Category::ALL {
            create_test_file(
                &dir,
                &category.template_file(),
                &format!("{{{}}}", category.name()),
            );
        }
        let source = StaticSource::new()
            .with(Category::Architectures, "x86")
            .with(Category::Passes, "mem2reg");

        let output = dir.path().join("gen");
        let results = generator(dir.path(), &output).generate_all(&source, &Category::ALL);

        let summary: Vec<(Category, bool)> = results
            .iter()
            .map(|(category, result)| (*category, result.is_ok()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Category::Architectures, true),
                (Category::Options, false),
                (Category::Passes, true),
                (Category::Resources, false),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(output.join("ref_architectures.rst")).unwrap(),
            "x86\n"
        );
    }
}
