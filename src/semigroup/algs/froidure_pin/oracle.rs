//! A deliberately naive breadth-first enumeration, kept only to cross-check
//! [`super::FroidurePinEngine`] in tests. No word-tree, no Cayley-graph
//! shortcuts: every product is computed directly and looked up in a set.

use crate::element::ElementOps;
use crate::DetHashMap;

/// Enumerate every element reachable from `generators` by repeated
/// multiplication, returning them in discovery order.
pub(crate) fn enumerate_naive<E: ElementOps>(generators: &[E]) -> Vec<E> {
    let mut elements: Vec<E> = Vec::new();
    let mut seen: DetHashMap<E, usize> = DetHashMap::default();
    for gen in generators {
        if !seen.contains_key(gen) {
            seen.insert(gen.clone(), elements.len());
            elements.push(gen.clone());
        }
    }
    let mut frontier_start = 0;
    while frontier_start < elements.len() {
        let frontier_end = elements.len();
        for i in frontier_start..frontier_end {
            for gen in generators {
                let product = elements[i].multiply(gen);
                if !seen.contains_key(&product) {
                    seen.insert(product.clone(), elements.len());
                    elements.push(product);
                }
            }
        }
        frontier_start = frontier_end;
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::enumerate_naive;
    use crate::element::transformation::Transformation;

    #[test]
    fn matches_known_size() {
        let gens = vec![
            Transformation::from_vec(6, vec![1, 1, 3, 3, 4, 5]).unwrap(),
            Transformation::from_vec(6, vec![4, 2, 3, 3, 5, 5]).unwrap(),
        ];
        assert_eq!(enumerate_naive(&gens).len(), 7);
    }
}
