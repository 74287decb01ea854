use crate::config::settings::Settings;
use crate::document::FileCategory;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `(ancestor level, file template)` for each sibling artifact.
///
/// Level 0 is the testlog's own directory. Templates understand `{func}`,
/// `{dirspec}` and `{testreport}`.
const LAYOUT: [(FileCategory, usize, &str); 14] = [
    (FileCategory::Csv, 3, "TestCsv/{func}.csv"),
    (FileCategory::Ini, 3, "TestCsv/{func}.ini"),
    (FileCategory::Xeat, 3, "TestCsv/{func}.xeat"),
    (FileCategory::Xtct, 3, "TestCsv/{func}.xtct"),
    (FileCategory::Ie, 3, "TestCsv/{func}_IE.html"),
    (FileCategory::Io, 3, "TestCsv/{func}_IO.html"),
    (FileCategory::Oe, 3, "TestCsv/{func}_OE.html"),
    (FileCategory::Tc, 3, "TestCsv/{func}_TC.html"),
    (FileCategory::Info, 2, "{func}_Info.html"),
    (FileCategory::Table, 2, "{func}_Table.html"),
    (FileCategory::Report, 2, "TestReport.htm"),
    (FileCategory::ReportCsv, 2, "TestReport.csv"),
    (FileCategory::Stub, 3, "AMSTB_SrcFile.c"),
    (FileCategory::Xlsx, 2, "{dirspec}/{func}.xlsx"),
];

/// Localized fallbacks used when the primary report file is absent.
const REPORT_FALLBACKS: [(FileCategory, usize, &str); 2] = [
    (FileCategory::Report, 2, "{testreport}.htm"),
    (FileCategory::ReportCsv, 2, "{testreport}.csv"),
];

/// Expected location of every artifact that accompanies one testlog.
#[derive(Debug, Clone)]
pub struct FileCollection {
    pub files: BTreeMap<FileCategory, PathBuf>,
    /// The tool's own output layout: the testlog sits in a directory named
    /// after the source file.
    pub tool_native: bool,
}

impl FileCollection {
    pub fn collect(testlog: &Path, func: &str, src_name: Option<&str>, settings: &Settings) -> Self {
        let parent_name = testlog
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str());
        let tool_native = src_name.is_some() && src_name == parent_name;

        let render = |template: &str| {
            template
                .replace("{func}", func)
                .replace("{dirspec}", &settings.dictionary.spec_dir)
                .replace("{testreport}", &settings.dictionary.test_report)
        };
        let locate = |category: FileCategory, level: usize, template: &str| {
            let relative = render(template);
            if !tool_native && category != FileCategory::Xlsx {
                let name = relative.rsplit('/').next().unwrap_or(&relative).to_owned();
                return ancestor(testlog, 0).join(name);
            }
            relative
                .split('/')
                .fold(ancestor(testlog, level), |path, part| path.join(part))
        };

        let mut files = BTreeMap::new();
        files.insert(FileCategory::Testlog, testlog.to_path_buf());
        for (category, level, template) in LAYOUT {
            files.insert(category, locate(category, level, template));
        }
        for (category, level, template) in REPORT_FALLBACKS {
            let fallback = locate(category, level, template);
            if let Some(primary) = files.get_mut(&category)
                && !primary.is_file()
                && fallback.is_file()
            {
                *primary = fallback;
            }
        }

        Self { files, tool_native }
    }

    pub fn path(&self, category: FileCategory) -> Option<&Path> {
        self.files.get(&category).map(PathBuf::as_path)
    }

    pub fn exists(&self, category: FileCategory) -> bool {
        self.path(category).is_some_and(Path::is_file)
    }

    pub fn remove(&mut self, category: FileCategory) {
        self.files.remove(&category);
    }
}

/// `level`-th directory above the testlog, clamped at the outermost one.
fn ancestor(testlog: &Path, level: usize) -> PathBuf {
    let mut ancestors = testlog.ancestors().skip(1).peekable();
    let mut current = ancestors.peek().map(|path| path.to_path_buf()).unwrap_or_default();
    for path in ancestors.take(level + 1) {
        current = path.to_path_buf();
    }
    current
}
