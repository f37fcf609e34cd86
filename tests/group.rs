use retrace::{group, stack, undoable, Error, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn group_records_one_entry() {
    stack().clear();
    let seq: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let add = undoable("Add", {
        let seq = Rc::clone(&seq);
        move |_, state| {
            seq.borrow_mut()
                .push(state.arg(0).and_then(Value::as_int).unwrap_or_default());
            Ok(Value::Nil)
        }
    })
    .undo({
        let seq = Rc::clone(&seq);
        move |_, _| {
            seq.borrow_mut().pop();
            Ok(())
        }
    });

    group("Add {count} items", || {
        for item in [4, 6, 8] {
            add.call([Value::from(item)])?;
        }
        Ok::<_, Error>(())
    })
    .unwrap();

    assert_eq!(stack().undo_count(), 1);
    assert_eq!(*seq.borrow(), [4, 6, 8]);
    assert_eq!(stack().undo_text().as_deref(), Some("Undo Add 3 items"));

    stack().undo().unwrap().unwrap();
    assert!(seq.borrow().is_empty());
    stack().redo().unwrap().unwrap();
    assert_eq!(*seq.borrow(), [4, 6, 8]);
}

#[test]
fn group_undoes_in_reverse_order() {
    stack().clear();
    let log = Rc::new(RefCell::new(Vec::new()));
    let step = undoable("Step", |_, _| Ok(Value::Nil)).undo({
        let log = Rc::clone(&log);
        move |_, state| {
            log.borrow_mut()
                .push(state.arg(0).and_then(Value::as_int).unwrap_or_default());
            Ok(())
        }
    });

    group("steps", || {
        for id in [1, 2, 3] {
            step.call([Value::from(id)])?;
        }
        Ok::<_, Error>(())
    })
    .unwrap();

    stack().undo().unwrap().unwrap();
    assert_eq!(*log.borrow(), [3, 2, 1]);
}

#[test]
fn empty_group_is_recorded_and_undoes_as_noop() {
    stack().clear();
    group("empty", || Ok::<_, Error>(())).unwrap();
    assert_eq!(stack().undo_count(), 1);
    stack().undo().unwrap().unwrap();
    assert_eq!(stack().redo_count(), 1);
}

#[test]
fn nested_groups_collapse_into_the_outer_group() {
    stack().clear();
    let seq: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let add = undoable("Add", {
        let seq = Rc::clone(&seq);
        move |_, state| {
            seq.borrow_mut()
                .push(state.arg(0).and_then(Value::as_int).unwrap_or_default());
            Ok(Value::Nil)
        }
    })
    .undo({
        let seq = Rc::clone(&seq);
        move |_, _| {
            seq.borrow_mut().pop();
            Ok(())
        }
    });

    group("outer", || {
        add.call([Value::from(1)])?;
        group("inner", || {
            add.call([Value::from(2)])?;
            add.call([Value::from(3)])?;
            Ok::<_, Error>(())
        })?;
        add.call([Value::from(4)])?;
        Ok::<_, Error>(())
    })
    .unwrap();

    assert_eq!(stack().undo_count(), 1);
    assert_eq!(*seq.borrow(), [1, 2, 3, 4]);
    stack().undo().unwrap().unwrap();
    assert!(seq.borrow().is_empty());
}

#[test]
fn failed_group_records_nothing() {
    stack().clear();
    let seq: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let add = undoable("Add", {
        let seq = Rc::clone(&seq);
        move |_, state| {
            seq.borrow_mut()
                .push(state.arg(0).and_then(Value::as_int).unwrap_or_default());
            Ok(Value::Nil)
        }
    })
    .undo(|_, _| Ok(()));

    let result: Result<(), &str> = group("g", || {
        add.call([Value::from(1)]).map_err(|_| "call failed")?;
        Err("bail")
    });
    assert_eq!(result.unwrap_err(), "bail");
    assert_eq!(stack().undo_count(), 0);
    // Side effects of already-run actions stay in place.
    assert_eq!(*seq.borrow(), [1]);
}

#[test]
fn panicking_group_restores_the_receiver() {
    stack().clear();
    let result = std::panic::catch_unwind(|| group::<(), Error>("g", || panic!("boom")));
    assert!(result.is_err());

    // The receiver is back on the main sequence.
    let noop = undoable("Noop", |_, _| Ok(Value::Nil)).undo(|_, _| Ok(()));
    noop.call([]).unwrap();
    assert_eq!(stack().undo_count(), 1);
}
