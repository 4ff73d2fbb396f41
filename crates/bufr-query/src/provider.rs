use bufr_model::{Typ, TypeInfo};

/// Access to one decoded subset: its expanded descriptor table (the
/// jump/link table) and its value inventory.
///
/// Node indices run `inode()..=isc(inode())` and identify entries of the
/// expanded table. The inventory is a flat sequence of node instances in
/// walk order, addressed by 1-based cursors.
///
/// # Table layout
///
/// The table is laid out depth-first. A replication construct is a marker
/// node ([`Typ::DelayedRep`], [`Typ::DelayedRepStacked`], [`Typ::FixedRep`],
/// [`Typ::DelayedBinary`]) immediately followed by the body node it
/// replicates ([`Typ::Repeat`], [`Typ::StackedRepeat`], or
/// [`Typ::Sequence`]), then the body's children. Plain sequences are a
/// single [`Typ::Sequence`] node. Marker tags carry the framed mnemonic
/// (e.g. `{PLEVL}`); body nodes carry the bare mnemonic.
///
/// `jmpb` is the parent node (the enclosing body, or the subset node; `0`
/// for the subset node itself). `link` is the node at which a construct
/// closes: a marker links to the first node of its next sibling, to
/// `isc + 1` when it is the last element of the subset, and to `0` when it
/// is the last element of an enclosing sequence. Body nodes and plain
/// sequences link to themselves; the walk re-enters them on each occurrence.
///
/// # Inventory layout
///
/// The subset node comes first, then the walk of its contents:
///
/// - value nodes appear once per occurrence with their decoded value;
/// - a fixed replication of arity N appears as its marker followed by
///   N repetitions of body-plus-children (the arity is not carried as a
///   value, which is why counts are reconstructed structurally);
/// - a delayed (or stacked) replication appears as its marker carrying the
///   occurrence count as its value, N repetitions of body-plus-children,
///   and one trailing body entry where the loop test re-enters the body
///   head before falling through;
/// - a delayed binary appears as its marker with value 0 or 1, followed by
///   body-plus-children only when present.
pub trait DataProvider {
    /// First node index of the current subset (the subset node).
    fn inode(&self) -> usize;

    /// Last node index of the subset starting at `node`.
    fn isc(&self, node: usize) -> usize;

    /// Length of the value inventory. Cursors are `1..=n_val()`.
    fn n_val(&self) -> usize;

    /// Node index at an inventory cursor.
    fn inv(&self, cursor: usize) -> usize;

    /// Raw decoded value at an inventory cursor.
    fn val(&self, cursor: usize) -> f64;

    fn typ(&self, node: usize) -> Typ;

    fn tag(&self, node: usize) -> &str;

    /// Parent node in the table; `0` for the subset node.
    fn jmpb(&self, node: usize) -> usize;

    /// Close target of the node; see the trait docs.
    fn link(&self, node: usize) -> usize;

    fn type_info(&self, node: usize) -> TypeInfo;

    /// Mnemonic of the current subset, used as the resolution cache key.
    fn subset_name(&self) -> &str;
}
