use crate::error::{InsertionLogError, Result};
use crate::render::{reprint, rewind};
use crate::store::{line_count, Message, MessageStore};
use std::io::Write;

/// A live-updating list of messages drawn onto a terminal with cursor-relative redraws.
///
/// The log owns its sink: after every call the last [InsertionLog::line_count] rows above the
/// cursor show the tracked messages in order, and the cursor sits at column 0 just below them.
/// That only holds while nothing else writes to the same terminal.
///
/// ```
/// use insertion_log::InsertionLog;
///
/// let mut log = InsertionLog::new(Vec::<u8>::new());
/// log.log("compiling", Some("build"))?;
/// log.append("build", "... done")?;
/// assert_eq!(log.messages()[0].contents(), "compiling... done");
/// # Ok::<(), insertion_log::InsertionLogError>(())
/// ```
pub struct InsertionLog<W: Write> {
    output: W,
    store: MessageStore,
}

impl<W: Write> InsertionLog<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            store: MessageStore::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Rows currently occupied by tracked messages.
    pub fn line_count(&self) -> usize {
        self.store.line_count()
    }

    pub fn get_ref(&self) -> &W {
        &self.output
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    /// Prints a new message below everything else.
    pub fn log(&mut self, text: &str, id: Option<&str>) -> Result<()> {
        self.store.append(Message::new(text, id));
        self.reprint(1)
    }

    /// Grows the message `id` by `extra` and redraws it along with everything below it.
    ///
    /// `extra` may contain newlines; the rows below simply move down.
    pub fn append(&mut self, id: &str, extra: &str) -> Result<()> {
        let index = self.store.find_index_by_id(id)?;
        let tail = self.store.len() - index;
        self.rewind(tail)?;
        self.store.message_mut(index).push_str(extra);
        self.reprint(tail)
    }

    pub fn insert_before(&mut self, before_id: &str, text: &str, id: Option<&str>) -> Result<()> {
        let index = self.store.find_index_by_id(before_id)?;
        self.insert_at(index, text, id)
    }

    pub fn insert_after(&mut self, after_id: &str, text: &str, id: Option<&str>) -> Result<()> {
        let index = self.store.find_index_by_id(after_id)? + 1;
        self.insert_at(index, text, id)
    }

    fn insert_at(&mut self, index: usize, text: &str, id: Option<&str>) -> Result<()> {
        self.store.insert_at(index, Message::new(text, id));
        let tail = self.store.len() - index;
        // The new message has not been painted yet, only what follows it is on screen.
        self.rewind(tail - 1)?;
        self.reprint(tail)
    }

    /// Swaps the contents of message `id` for `text`.
    ///
    /// Fails with [InsertionLogError::LineCountMismatch] before touching the terminal unless `text`
    /// has exactly as many lines as the current contents, since the rows below could not be kept
    /// in place otherwise.
    pub fn replace(&mut self, id: &str, text: &str) -> Result<()> {
        let index = self.store.find_index_by_id(id)?;
        let expected = self.store.messages()[index].line_count();
        let actual = line_count(text);
        if expected != actual {
            return Err(InsertionLogError::LineCountMismatch {
                id: id.to_owned(),
                expected,
                actual,
            });
        }
        let tail = self.store.len() - index;
        self.rewind(tail)?;
        self.store.message_mut(index).set_contents(text);
        self.reprint(tail)
    }

    /// Stops tracking message `id` and everything above it. Nothing is written; the rows stay on
    /// screen but can no longer be redrawn.
    pub fn flush(&mut self, id: &str) -> Result<()> {
        let index = self.store.find_index_by_id(id)?;
        log::debug!("Flushing {} messages through id {id}", index + 1);
        self.store.truncate_before(index + 1);
        Ok(())
    }

    /// Moves the cursor up over the last `count` messages.
    pub fn rewind(&mut self, count: usize) -> Result<()> {
        rewind(&mut self.output, self.store.tail(count))?;
        Ok(())
    }

    /// Paints the last `count` messages from the cursor down.
    pub fn reprint(&mut self, count: usize) -> Result<()> {
        reprint(&mut self.output, self.store.tail(count))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::error::InsertionLogError;
    use crate::insertion_log::InsertionLog;
    use crate::replay::{describe, Screen};
    use std::io::{self, Write};

    fn contents(log: &InsertionLog<Vec<u8>>) -> Vec<&str> {
        log.messages().iter().map(|m| m.contents()).collect()
    }

    /// Sink bytes written since `mark`.
    fn since(log: &InsertionLog<Vec<u8>>, mark: usize) -> String {
        describe(&log.get_ref()[mark..])
    }

    fn assert_screen_matches(log: &InsertionLog<Vec<u8>>) {
        let mut screen = Screen::new();
        screen.process(log.get_ref());
        let expected: Vec<String> = log
            .messages()
            .iter()
            .flat_map(|m| m.lines())
            .map(str::to_owned)
            .collect();
        assert_eq!(screen.tail(log.line_count()), expected);
        assert_eq!(screen.cursor_row(), screen.lines().len());
        assert_eq!(screen.cursor_col(), 0);
    }

    #[test]
    fn logging_only_appends() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("A", None).unwrap();
        log.log("B", None).unwrap();
        insta::assert_snapshot!(describe(log.get_ref()), @"{el 2}{cha 0}A{lf}{el 2}{cha 0}B{lf}");
        assert_screen_matches(&log);
    }

    #[test]
    fn multi_line_messages_print_every_line() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("one\ntwo", None).unwrap();
        assert_eq!(
            log.get_ref().as_slice(),
            b"\x1b[2K\x1b[0Gone\n\x1b[2K\x1b[0Gtwo\n"
        );
        assert_eq!(log.line_count(), 2);
    }

    #[test]
    fn append_rewinds_and_reprints() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("step1", Some("s1")).unwrap();
        let mark = log.get_ref().len();
        log.append("s1", "...done").unwrap();
        insta::assert_snapshot!(since(&log, mark), @"{up 1}{el 2}{cha 0}step1...done{lf}");
        assert_screen_matches(&log);
    }

    #[test]
    fn append_to_interior_message_reprints_tail() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("a")).unwrap();
        log.log("b\nb", Some("b")).unwrap();
        log.log("c", Some("c")).unwrap();
        let mark = log.get_ref().len();
        log.append("b", "!").unwrap();
        insta::assert_snapshot!(
            since(&log, mark),
            @"{up 3}{el 2}{cha 0}b{lf}{el 2}{cha 0}b!{lf}{el 2}{cha 0}c{lf}"
        );
        assert_eq!(contents(&log), vec!["a", "b\nb!", "c"]);
        assert_screen_matches(&log);
    }

    #[test]
    fn append_may_add_lines() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("top", Some("top")).unwrap();
        log.log("bottom", None).unwrap();
        log.append("top", "\nmore").unwrap();
        assert_eq!(log.line_count(), 3);
        assert_screen_matches(&log);
    }

    #[test]
    fn insert_before_rewinds_only_painted_rows() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("x")).unwrap();
        log.log("b", None).unwrap();
        let mark = log.get_ref().len();
        log.insert_before("x", "pre", None).unwrap();
        assert_eq!(contents(&log), vec!["pre", "a", "b"]);
        insta::assert_snapshot!(
            since(&log, mark),
            @"{up 2}{el 2}{cha 0}pre{lf}{el 2}{cha 0}a{lf}{el 2}{cha 0}b{lf}"
        );
        assert_screen_matches(&log);
    }

    #[test]
    fn insert_after_last_message_just_prints() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("x")).unwrap();
        let mark = log.get_ref().len();
        log.insert_after("x", "post", Some("y")).unwrap();
        insta::assert_snapshot!(since(&log, mark), @"{el 2}{cha 0}post{lf}");
        assert_eq!(log.messages()[1].id(), Some("y"));
    }

    #[test]
    fn insert_after_interior_message() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("x")).unwrap();
        log.log("c\nc", None).unwrap();
        let mark = log.get_ref().len();
        log.insert_after("x", "b", None).unwrap();
        insta::assert_snapshot!(
            since(&log, mark),
            @"{up 2}{el 2}{cha 0}b{lf}{el 2}{cha 0}c{lf}{el 2}{cha 0}c{lf}"
        );
        assert_eq!(contents(&log), vec!["a", "b", "c\nc"]);
        assert_screen_matches(&log);
    }

    #[test]
    fn replace_with_same_line_count() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("waiting\n..", Some("w")).unwrap();
        log.log("after", None).unwrap();
        let mark = log.get_ref().len();
        log.replace("w", "finished\nok").unwrap();
        insta::assert_snapshot!(
            since(&log, mark),
            @"{up 3}{el 2}{cha 0}finished{lf}{el 2}{cha 0}ok{lf}{el 2}{cha 0}after{lf}"
        );
        assert_screen_matches(&log);
    }

    #[test]
    fn replace_rejects_line_count_change() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("one line", Some("w")).unwrap();
        let mark = log.get_ref().len();
        match log.replace("w", "two\nlines") {
            Err(InsertionLogError::LineCountMismatch {
                id,
                expected,
                actual,
            }) => {
                assert_eq!(id, "w");
                assert_eq!((expected, actual), (1, 2));
            }
            other => panic!("unexpected replace result: {other:?}"),
        }
        assert_eq!(log.get_ref().len(), mark);
        assert_eq!(contents(&log), vec!["one line"]);
    }

    #[test]
    fn unknown_ids_write_nothing() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("a")).unwrap();
        let mark = log.get_ref().len();
        assert!(log.append("nope", "x").is_err());
        assert!(log.replace("nope", "x").is_err());
        assert!(log.insert_before("nope", "x", None).is_err());
        assert!(log.insert_after("nope", "x", None).is_err());
        let err = log.flush("nope").unwrap_err();
        assert_eq!(err.to_string(), "No message for id: nope");
        assert_eq!(log.get_ref().len(), mark);
        assert_eq!(contents(&log), vec!["a"]);
    }

    #[test]
    fn flush_forgets_prefix_silently() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("a")).unwrap();
        log.log("b", Some("b")).unwrap();
        log.log("c", Some("c")).unwrap();
        let mark = log.get_ref().len();
        log.flush("b").unwrap();
        assert_eq!(log.get_ref().len(), mark);
        assert_eq!(contents(&log), vec!["c"]);

        log.append("c", "!").unwrap();
        insta::assert_snapshot!(since(&log, mark), @"{up 1}{el 2}{cha 0}c!{lf}");
        assert_screen_matches(&log);
    }

    #[test]
    fn flushed_ids_are_not_found() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("a")).unwrap();
        log.log("b", Some("b")).unwrap();
        log.flush("a").unwrap();
        assert!(matches!(
            log.insert_before("a", "x", None),
            Err(InsertionLogError::MessageNotFound { .. })
        ));
        log.insert_before("b", "x", None).unwrap();
        assert_eq!(contents(&log), vec!["x", "b"]);
    }

    #[test]
    fn flushing_newest_empties_log() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a", Some("a")).unwrap();
        log.flush("a").unwrap();
        assert!(log.is_empty());
        assert_eq!(log.line_count(), 0);
    }

    #[test]
    fn duplicate_ids_target_latest() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("first", Some("dup")).unwrap();
        log.log("second", Some("dup")).unwrap();
        log.append("dup", "!").unwrap();
        assert_eq!(contents(&log), vec!["first", "second!"]);
    }

    #[test]
    fn rewind_reprint_pair_is_idempotent() {
        let mut log = InsertionLog::new(Vec::<u8>::new());
        log.log("a\nb", None).unwrap();
        log.log("c", None).unwrap();
        let mark = log.get_ref().len();
        log.rewind(2).unwrap();
        log.reprint(2).unwrap();
        let first = log.get_ref()[mark..].to_vec();
        let mark = log.get_ref().len();
        log.rewind(2).unwrap();
        log.reprint(2).unwrap();
        assert_eq!(&log.get_ref()[mark..], first.as_slice());
        assert_screen_matches(&log);
    }

    #[test]
    fn works_over_borrowed_sink() {
        let mut output: Vec<u8> = Vec::new();
        {
            let mut log = InsertionLog::new(&mut output);
            log.log("x", None).unwrap();
        }
        assert_eq!(output, b"\x1b[2K\x1b[0Gx\n");
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_failures_propagate() {
        let mut log = InsertionLog::new(BrokenSink);
        match log.log("lost", Some("l")) {
            Err(InsertionLogError::Sink(err)) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected log result: {other:?}"),
        }
        // The buffer keeps the mutation, the terminal never saw it.
        assert_eq!(log.len(), 1);
    }
}
