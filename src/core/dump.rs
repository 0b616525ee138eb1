//! Plain-text mesh dumps for plotting and debugging.
//!
//! The format is one record per line: `v x y` for vertices, then
//! `e x1 y1 x2 y2` for edges with a trailing `c` on constrained ones. It
//! loads directly into gnuplot or a few lines of matplotlib.

use std::io;

use crate::core::handles::HandleType;
use crate::core::mesh::Mesh;

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    /// Writes the vertex and edge records to `writer`.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn dump_mesh<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.dump_string().as_bytes())
    }

    /// The dump as a string.
    #[must_use]
    pub fn dump_string(&self) -> String {
        let mut out = String::new();
        self.for_each_vertex(|e| {
            let p = self.org(e);
            out.push_str(&format!("v {} {}\n", p.x, p.y));
        });
        self.for_each_edge(|e| {
            let s = self.edge_segment(e);
            let mark = if self.is_constrained(e) { " c" } else { "" };
            out.push_str(&format!(
                "e {} {} {} {}{mark}\n",
                s.start.x, s.start.y, s.end.x, s.end.y
            ));
        });
        out
    }
}
