#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CSV: &str = "\
mod,\"src/motor/ctrl.c/Motor_Step\",\"Motor_Step\",2,1
#InitWheneverCall,out,count
1,0,0
#COMMENT,@speed,$$ptr,out
%,,helper_a
%,stub_b,Stub_b
";

pub const TABLE_HTML: &str = "<html><body><h4>Motor_Step</h4>\
    <a href=\"x\">Motor_Step.csv</a><table>\
    <tr><td>No.</td><td>Test Analysis Item</td><td>ID</td><td>Confirmation</td>\
    <td>Comment</td><td>speed</td><td>ptr</td><td>out</td></tr>\
    <tr><td></td><td></td><td></td><td></td><td></td>\
    <td class=\"head-input-no\">@speed</td><td class=\"head-input-no-last\">$$ptr</td>\
    <td class=\"head-output-no-last\">out</td></tr>\
    <tr><td class=\"data-no\">1</td><td>speed</td><td>Variable</td><td class=\"data-no\">OK</td>\
    <td>low</td><td>0</td><td>0</td><td>0</td></tr>\
    <tr><td class=\"data-no\">2</td><td>speed</td><td>Variable</td><td class=\"data-no\">OK</td>\
    <td>low</td><td>1</td><td>0</td><td>1</td></tr>\
    <tr><td class=\"data-no-last\">3</td><td>limit</td><td>Boundary</td><td class=\"data-no-last\">OK</td>\
    <td></td><td>9</td><td>0</td><td>9</td></tr>\
    </table></body></html>";

pub const IE_HTML: &str = "<html><body><h4>IE</h4><table>\
    <tr><td>Item</td><td>Detail</td><td>Var 1</td><td>Var 2</td></tr>\
    <tr><td rowspan=\"3\">Input</td><td rowspan=\"3\">-</td>\
    <td class=\"title-input-kind\">Argument</td><td class=\"title-input-kind-r\">Global</td></tr>\
    <tr><td>@speed</td><td>$$ptr</td></tr>\
    <tr><td>int</td><td>int *</td></tr>\
    <tr><td class=\"input-tp-uniqid-w\">speed</td><td class=\"input-tp-id\">Variable</td><td></td><td></td></tr>\
    <tr><td class=\"input-tp-uniqid-w\">speed</td><td class=\"input-tp-comment\">low</td><td></td><td></td></tr>\
    <tr><td class=\"input-tp-uniqid-w\">limit</td><td class=\"input-tp-id\">Boundary</td><td></td><td></td></tr>\
    <tr><td class=\"input-tp-uniqid-w\">limit</td><td class=\"input-tp-comment\"></td><td></td><td></td></tr>\
    </table></body></html>";

pub const IO_HTML: &str = "<html><body><h4>IO</h4><table>\
    <tr><td>No.</td><td colspan=\"3\">Variables</td></tr>\
    <tr><td rowspan=\"4\">-</td><td colspan=\"3\">Kind</td></tr>\
    <tr><td class=\"title-input-kind\">Argument</td><td class=\"title-input-kind\">Argument</td>\
    <td class=\"title-output-kind-r\">Global</td></tr>\
    <tr><td>@speed</td><td>$$ptr</td><td>out</td></tr>\
    <tr><td>int</td><td>int</td><td>int</td></tr>\
    </table></body></html>";

pub fn report_html(c0: &str) -> String {
    format!(
        "<html><body>\
         <table><tr><td>Top CSV</td><td>C:\\work\\TestCsv\\Motor_Step.csv</td></tr>\
         <tr><td>Title</td><td>f</td></tr></table>\
         <table><tr><td>Tool</td><td>x</td></tr></table>\
         <table><tr><td>Function</td><td>C0</td><td>C1</td><td>MC/DC</td></tr>\
         <tr><td>f</td><td>{c0}</td><td>100%</td><td>100%</td></tr></table>\
         </body></html>"
    )
}

/// Artifacts of one function laid out the way the test tool writes them.
pub struct Workspace {
    pub root: TempDir,
    pub testlog: PathBuf,
}

impl Workspace {
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(path, contents).expect("write fixture file");
    }
}

pub fn testlog_text(source: &Path, c0: &str) -> String {
    format!(
        "Function: src/motor/ctrl.c/Motor_Step\n\
         Source: {}\n\
         C0: {c0}\nC1: 100%\nMC/DC: 100%\n\
         Test Time: 2024/01/05 10:11:12\n\n\
         \x20 1  void Motor_Step(int speed)\n\
         \x20 2  {{\n",
        source.display()
    )
}

pub fn workspace() -> Workspace {
    let root = TempDir::new().expect("create workspace");
    let testlog = root.path().join("func/out/ctrl.c/Motor_Step.txt");
    let workspace = Workspace { root, testlog };

    workspace.write("src/motor/ctrl.c", "void Motor_Step(int speed) {}\n");
    let source = workspace.path("src/motor/ctrl.c");
    workspace.write("func/out/ctrl.c/Motor_Step.txt", &testlog_text(&source, "100%"));

    workspace.write("TestCsv/Motor_Step.csv", CSV);
    for name in ["Motor_Step.ini", "Motor_Step.xeat", "Motor_Step.xtct", "AMSTB_SrcFile.c"] {
        workspace.write(&format!("TestCsv/{name}"), "x");
    }
    workspace.write("TestCsv/Motor_Step_IE.html", IE_HTML);
    workspace.write("TestCsv/Motor_Step_IO.html", IO_HTML);
    workspace.write(
        "TestCsv/Motor_Step_OE.html",
        "<html><body><h4>OE</h4><table><tr><td>out</td></tr></table></body></html>",
    );
    workspace.write("TestCsv/Motor_Step_TC.html", "<html></html>");
    workspace.write("func/Motor_Step_Info.html", "<html></html>");
    workspace.write("func/Motor_Step_Table.html", TABLE_HTML);
    workspace.write("func/TestReport.htm", &report_html("100%"));
    workspace.write("func/TestReport.csv", "x");
    workspace
}
